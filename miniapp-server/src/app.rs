use crate::config::ServerConfig;
use crate::me::{me_router, AppState};
use axum::http::header::CONTENT_SECURITY_POLICY;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Full service: API routes, the built UI when `STATIC_DIR` is set, and the
/// framing policy on every response.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut app = me_router(state);

    if let Some(dir) = &config.static_dir {
        let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = if config.asset_prefix.is_empty() {
            app.fallback_service(assets)
        } else {
            app.nest_service(&config.asset_prefix, assets)
        };
    }

    app.layer(SetResponseHeaderLayer::overriding(
        CONTENT_SECURITY_POLICY,
        config.frame_ancestors.clone(),
    ))
    .layer(TraceLayer::new_for_http())
}
