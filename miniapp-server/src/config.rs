use crate::{primary_address, quick_auth};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

pub const DEFAULT_FRAME_ANCESTORS: &str = "frame-ancestors 'self' https://farcaster.xyz https://*.farcaster.xyz https://minidev.fun https://*.minidev.fun https://*.vercel.app http://localhost:* http://127.0.0.1:* https://127.0.0.1:*";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is not a valid URL with a host: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("BIND_ADDR is not a socket address: {0}")]
    InvalidBindAddr(String),
    #[error("FRAME_ANCESTORS is not a valid header value")]
    InvalidFrameAncestors,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Hostname tokens must be issued for.
    pub domain: String,
    pub quick_auth_origin: String,
    pub farcaster_api_url: String,
    pub static_dir: Option<PathBuf>,
    pub asset_prefix: String,
    pub frame_ancestors: HeaderValue,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_url = get("NEXTAUTH_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("NEXTAUTH_URL"))?;
        let domain = domain_from_url(&app_url).ok_or_else(|| ConfigError::InvalidUrl {
            var: "NEXTAUTH_URL",
            value: app_url.clone(),
        })?;

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let frame_ancestors = HeaderValue::from_str(
            &get("FRAME_ANCESTORS").unwrap_or_else(|| DEFAULT_FRAME_ANCESTORS.into()),
        )
        .map_err(|_| ConfigError::InvalidFrameAncestors)?;

        let asset_prefix = match get("ASSET_PREFIX").map(|p| p.trim_matches('/').to_string()) {
            Some(p) if !p.is_empty() => format!("/{p}"),
            _ => String::new(),
        };

        Ok(Self {
            bind_addr,
            domain,
            quick_auth_origin: get("QUICK_AUTH_ORIGIN")
                .unwrap_or_else(|| quick_auth::DEFAULT_ORIGIN.into()),
            farcaster_api_url: get("FARCASTER_API_URL")
                .unwrap_or_else(|| primary_address::DEFAULT_API_URL.into()),
            static_dir: get("STATIC_DIR").filter(|v| !v.is_empty()).map(PathBuf::from),
            asset_prefix,
            frame_ancestors,
        })
    }
}

pub fn domain_from_url(raw: &str) -> Option<String> {
    let url = reqwest::Url::parse(raw).ok()?;
    url.host_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn domain_is_hostname_of_app_url() {
        let config = ServerConfig::from_lookup(lookup(&[(
            "NEXTAUTH_URL",
            "https://brave-cat.loca.lt:443/some/path",
        )]))
        .expect("config");
        assert_eq!(config.domain, "brave-cat.loca.lt");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().expect("addr"));
        assert_eq!(config.quick_auth_origin, quick_auth::DEFAULT_ORIGIN);
        assert_eq!(config.farcaster_api_url, primary_address::DEFAULT_API_URL);
        assert_eq!(config.frame_ancestors, DEFAULT_FRAME_ANCESTORS);
        assert!(config.static_dir.is_none());
        for origin in ["https://*.farcaster.xyz", "https://minidev.fun", "https://*.vercel.app"] {
            assert!(DEFAULT_FRAME_ANCESTORS.split(' ').any(|o| o == origin), "{origin}");
        }
    }

    #[test]
    fn app_url_is_required() {
        let err = ServerConfig::from_lookup(lookup(&[])).expect_err("missing");
        assert!(matches!(err, ConfigError::Missing("NEXTAUTH_URL")));

        let err = ServerConfig::from_lookup(lookup(&[("NEXTAUTH_URL", "not a url")]))
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("NEXTAUTH_URL", "http://localhost:3000"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("STATIC_DIR", "dist"),
            ("ASSET_PREFIX", "/p/abc/"),
            ("FRAME_ANCESTORS", "frame-ancestors 'self'"),
        ]))
        .expect("config");
        assert_eq!(config.domain, "localhost");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
        assert_eq!(config.asset_prefix, "/p/abc");
        assert_eq!(config.frame_ancestors, "frame-ancestors 'self'");
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("NEXTAUTH_URL", "http://localhost:3000"),
            ("BIND_ADDR", "everywhere"),
        ]))
        .expect_err("bad addr");
        assert!(matches!(err, ConfigError::InvalidBindAddr(_)));
    }
}
