use miniapp_server::app::build_app;
use miniapp_server::config::ServerConfig;
use miniapp_server::me::AppState;
use miniapp_server::primary_address::FarcasterApi;
use miniapp_server::quick_auth::QuickAuthClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("build http client");

    let state = AppState::new(
        Arc::new(QuickAuthClient::new(http.clone(), &config.quick_auth_origin)),
        Arc::new(FarcasterApi::new(http, &config.farcaster_api_url)),
        &config.domain,
    );
    let app = build_app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("bind listener");

    info!(addr = %config.bind_addr, domain = %config.domain, "miniapp-server listening");
    axum::serve(listener, app).await.expect("serve");
}
