use crate::domain::schedule::PlannedWeek;
use crate::error::NotifyError;
use crate::services::lifecycle::WeekReveal;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/weeks/:id/reveal", get(week_reveal))
        .route("/groups/:id/next-schedule", get(next_schedule))
        .with_state(state)
}

async fn week_reveal(
    State(state): State<SharedState>,
    Path(week_id): Path<Uuid>,
) -> Result<Json<WeekReveal>, NotifyError> {
    state.lifecycle.reveal_state(week_id, Utc::now()).await.map(Json)
}

/// Default drop and reveal times a curator would get for the next question.
async fn next_schedule(
    State(state): State<SharedState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<PlannedWeek>, NotifyError> {
    state.lifecycle.next_schedule(group_id, Utc::now()).await.map(Json)
}
