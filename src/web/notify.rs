use crate::error::NotifyError;
use crate::services::dispatcher::{DispatchOutcome, DispatchRequest};
use crate::services::lifecycle::SweepReport;
use crate::state::SharedState;
use axum::{extract::State, response::Json, routing::post, Router};
use chrono::Utc;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/notify", post(notify))
        .route("/sweeps/reveal", post(reveal_sweep))
        .route("/sweeps/reminders", post(reminder_sweep))
        .with_state(state)
}

/// Direct fan-out call, used by curator tooling and other services.
async fn notify(
    State(state): State<SharedState>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchOutcome>, NotifyError> {
    state.lifecycle.dispatcher().dispatch(&request).await.map(Json)
}

async fn reveal_sweep(State(state): State<SharedState>) -> Result<Json<SweepReport>, NotifyError> {
    state.lifecycle.reveal_sweep(Utc::now()).await.map(Json)
}

async fn reminder_sweep(State(state): State<SharedState>) -> Result<Json<SweepReport>, NotifyError> {
    state.lifecycle.reminder_sweep().await.map(Json)
}
