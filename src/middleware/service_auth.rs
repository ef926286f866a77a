//! Shared-secret guard for every route the store's webhooks and the
//! scheduler call.

use crate::error::NotifyError;
use crate::state::SharedState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn tag(key: &str, value: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
    mac.update(value.as_bytes());
    Some(mac)
}

/// Constant-time comparison of the presented key against the configured one.
pub fn keys_match(expected: &str, presented: &str) -> bool {
    match (tag(expected, expected), tag(expected, presented)) {
        (Some(reference), Some(candidate)) => candidate
            .verify_slice(&reference.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}

pub async fn require_service_key(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, NotifyError> {
    let authorized = extract_bearer(request.headers())
        .map(|presented| keys_match(&state.service_key, presented))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!("Rejected {} {} without a valid service key", request.method(), request.uri().path());
        return Err(NotifyError::Unauthorized);
    }

    Ok(next.run(request).await)
}
