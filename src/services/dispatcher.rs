use crate::db::NotificationStore;
use crate::domain::models::Notification;
use crate::error::NotifyError;
use crate::services::push::PushTransport;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub group_id: Uuid,
    #[serde(flatten)]
    pub message: Notification,
    #[serde(default)]
    pub exclude_member_id: Option<Uuid>,
    /// Restricts delivery to these members of the group (reminder path).
    #[serde(default)]
    pub member_ids: Option<Vec<Uuid>>,
}

impl DispatchRequest {
    pub fn to_group(group_id: Uuid, message: Notification) -> Self {
        Self {
            group_id,
            message,
            exclude_member_id: None,
            member_ids: None,
        }
    }

    pub fn excluding(mut self, member_id: Uuid) -> Self {
        self.exclude_member_id = Some(member_id);
        self
    }

    pub fn only(mut self, member_ids: Vec<Uuid>) -> Self {
        self.member_ids = Some(member_ids);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

impl DispatchOutcome {
    pub fn absorb(&mut self, other: DispatchOutcome) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
    }
}

/// Fans one message out to every push subscription of the targeted members.
///
/// Deliveries run concurrently and settle independently: a failing or slow
/// endpoint only adds to `failure_count`. Nothing is retried and no delivery
/// state is persisted, so re-running a trigger can notify someone twice.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn NotificationStore>,
    transport: Arc<dyn PushTransport>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, transport: Arc<dyn PushTransport>) -> Self {
        Self { store, transport }
    }

    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchOutcome, NotifyError> {
        let member_ids = self.store.group_member_ids(request.group_id).await?;
        if member_ids.is_empty() {
            return Err(NotifyError::NotFound(format!(
                "no members in group {}",
                request.group_id
            )));
        }

        let targets: Vec<Uuid> = member_ids
            .into_iter()
            .filter(|id| {
                request
                    .member_ids
                    .as_ref()
                    .map(|only| only.contains(id))
                    .unwrap_or(true)
            })
            .filter(|id| request.exclude_member_id != Some(*id))
            .collect();

        if targets.is_empty() {
            tracing::debug!("No remaining recipients in group {}", request.group_id);
            return Ok(DispatchOutcome::default());
        }

        let subscriptions = self.store.subscriptions_for_members(&targets).await?;
        if subscriptions.is_empty() {
            tracing::debug!(
                "No push subscriptions for {} members of group {}",
                targets.len(),
                request.group_id
            );
            return Ok(DispatchOutcome::default());
        }

        let attempts = subscriptions.iter().map(|subscription| async move {
            let result = self.transport.send(subscription, &request.message).await;
            (subscription, result)
        });

        let mut outcome = DispatchOutcome::default();
        for (subscription, result) in join_all(attempts).await {
            match result {
                Ok(()) => outcome.success_count += 1,
                Err(e) => {
                    outcome.failure_count += 1;
                    tracing::warn!(
                        "Push to subscription {} (member {}) failed: {}",
                        subscription.id,
                        subscription.member_id,
                        e
                    );
                }
            }
        }

        tracing::info!(
            "Sent {} notifications, {} failed for group {} ({:?})",
            outcome.success_count,
            outcome.failure_count,
            request.group_id,
            request.message.title
        );
        Ok(outcome)
    }
}
