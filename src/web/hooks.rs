//! Row-change webhooks from the hosted store.
use crate::error::NotifyError;
use crate::services::lifecycle::{ChangeEvent, TriggerOutcome};
use crate::state::SharedState;
use axum::{extract::State, response::Json, routing::post, Router};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/week-updated", post(week_updated))
        .route("/answer-inserted", post(answer_inserted))
        .route("/comment-inserted", post(comment_inserted))
        .with_state(state)
}

async fn week_updated(
    State(state): State<SharedState>,
    Json(event): Json<ChangeEvent>,
) -> Result<Json<TriggerOutcome>, NotifyError> {
    state.lifecycle.on_week_updated(&event).await.map(Json)
}

async fn answer_inserted(
    State(state): State<SharedState>,
    Json(event): Json<ChangeEvent>,
) -> Result<Json<TriggerOutcome>, NotifyError> {
    state.lifecycle.on_answer_inserted(&event).await.map(Json)
}

async fn comment_inserted(
    State(state): State<SharedState>,
    Json(event): Json<ChangeEvent>,
) -> Result<Json<TriggerOutcome>, NotifyError> {
    state.lifecycle.on_comment_inserted(&event).await.map(Json)
}
