use crate::domain::models::{Notification, PushSubscription};
use crate::error::DeliveryError;
use async_trait::async_trait;
use std::time::Duration;

/// Delivers one message to one subscription endpoint.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, subscription: &PushSubscription, message: &Notification) -> Result<(), DeliveryError>;
}

/// Posts the message as JSON straight to the subscription endpoint. The
/// client timeout bounds every attempt so a hung endpoint cannot hold up the
/// rest of a fan-out.
#[derive(Clone)]
pub struct WebPushTransport {
    client: reqwest::Client,
    ttl_secs: u32,
}

impl WebPushTransport {
    pub fn new(timeout: Duration, ttl_secs: u32) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, ttl_secs })
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(&self, subscription: &PushSubscription, message: &Notification) -> Result<(), DeliveryError> {
        let endpoint = subscription.endpoint().ok_or(DeliveryError::MissingEndpoint)?;

        let response = self
            .client
            .post(endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Rejected(response.status()));
        }
        Ok(())
    }
}
