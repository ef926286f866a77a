use crate::error::NotifyError;
use crate::services::sms;
use crate::state::SharedState;
use axum::{extract::State, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};

pub fn router(state: SharedState) -> Router {
    Router::new().route("/sms", post(send_sms)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct SmsPayload {
    #[serde(default)]
    to: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct SmsSent {
    success: bool,
    sid: String,
}

async fn send_sms(
    State(state): State<SharedState>,
    Json(payload): Json<SmsPayload>,
) -> Result<Json<SmsSent>, NotifyError> {
    if payload.to.trim().is_empty() || payload.message.trim().is_empty() {
        return Err(NotifyError::InvalidRequest("missing \"to\" or \"message\"".to_string()));
    }
    let client = state.sms.as_ref().ok_or(NotifyError::NotConfigured("SMS relay"))?;
    let to = sms::normalize_phone(&payload.to)
        .ok_or_else(|| NotifyError::InvalidRequest(format!("unusable phone number {:?}", payload.to)))?;

    let sid = client.send(&to, &payload.message).await?;
    tracing::info!("SMS {} sent", sid);
    Ok(Json(SmsSent { success: true, sid }))
}
