pub mod hooks;
pub mod notify;
pub mod sms;
pub mod weeks;

use crate::middleware::require_service_key;
use crate::state::SharedState;
use axum::{middleware, routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    let protected = Router::new()
        .nest("/hooks", hooks::router(state.clone()))
        .merge(notify::router(state.clone()))
        .merge(weeks::router(state.clone()))
        .merge(sms::router(state.clone()))
        .layer(middleware::from_fn_with_state(state, require_service_key));

    Router::new().route("/health", get(health)).merge(protected)
}
