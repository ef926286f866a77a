use crate::services::lifecycle::Lifecycle;
use crate::services::sms::SmsClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Lifecycle,
    pub sms: Option<SmsClient>,
    pub service_key: String,
}

pub type SharedState = Arc<AppState>;
