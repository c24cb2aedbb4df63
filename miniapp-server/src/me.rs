use crate::primary_address::{self, AddressLookup};
use crate::quick_auth::TokenVerifier;
use api_contract::ApiError;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub lookup: Arc<dyn AddressLookup>,
    pub domain: Arc<str>,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        lookup: Arc<dyn AddressLookup>,
        domain: &str,
    ) -> Self {
        Self {
            verifier,
            lookup,
            domain: domain.into(),
        }
    }
}

pub fn me_router(state: AppState) -> Router {
    Router::new()
        .route("/api/me", get(handle_me))
        .with_state(state)
}

async fn handle_me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return reject(StatusCode::UNAUTHORIZED, ApiError::MISSING_AUTHORIZATION);
    };

    debug!(domain = %state.domain, "verifying token for domain");
    match state.verifier.verify(token, &state.domain).await {
        Ok(claims) => {
            let user = primary_address::resolve_user(state.lookup.as_ref(), claims.fid).await;
            Json(user).into_response()
        }
        Err(err) if err.is_invalid_token() => {
            info!(%err, "invalid token");
            reject(StatusCode::UNAUTHORIZED, ApiError::INVALID_TOKEN)
        }
        Err(err) => {
            error!(%err, "quick auth error");
            reject(StatusCode::INTERNAL_SERVER_ERROR, ApiError::AUTHENTICATION_FAILED)
        }
    }
}

/// Token part of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ")?.split(' ').next()
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiError::new(message))).into_response()
}
