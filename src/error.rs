use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("upstream rejected request: {0}")]
    Upstream(String),
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl NotifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            NotifyError::NotFound(_) => StatusCode::NOT_FOUND,
            NotifyError::MalformedEvent(_) | NotifyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            NotifyError::Unauthorized => StatusCode::UNAUTHORIZED,
            NotifyError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            NotifyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            NotifyError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            NotifyError::Store(e) => tracing::error!("Store failure: {:#}", e),
            NotifyError::Upstream(_) | NotifyError::NotConfigured(_) => tracing::error!("{}", self),
            _ => tracing::warn!("{}", self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failure of a single push delivery. Counted by the dispatcher, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("subscription has no endpoint")]
    MissingEndpoint,
    #[error("push failed: {0}")]
    Rejected(reqwest::StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
