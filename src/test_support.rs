//! In-memory store and scripted push transport shared by the unit tests.

use crate::db::NotificationStore;
use crate::domain::models::{Group, Member, Notification, PushSubscription, QuestionType, Week, WeekStatus};
use crate::error::DeliveryError;
use crate::services::push::PushTransport;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub fn member(group_id: Uuid, name: &str) -> Member {
    Member {
        id: Uuid::new_v4(),
        group_id,
        name: name.to_string(),
        emoji: "😀".to_string(),
        is_curator: false,
        phone: None,
        user_id: None,
    }
}

pub fn subscription(member_id: Uuid, endpoint: &str) -> PushSubscription {
    PushSubscription {
        id: Uuid::new_v4(),
        member_id,
        subscription: serde_json::json!({
            "endpoint": endpoint,
            "keys": { "p256dh": "key", "auth": "secret" }
        }),
    }
}

pub fn week(group_id: Uuid, status: WeekStatus, question: &str, reveals_at: Option<DateTime<Utc>>) -> Week {
    Week {
        id: Uuid::new_v4(),
        group_id,
        week_number: 1,
        question_type: QuestionType::Debate,
        question: question.to_string(),
        option_a: Some("Yes".to_string()),
        option_b: Some("No".to_string()),
        correct_answer: None,
        items: None,
        status,
        drops_at: None,
        reveals_at,
    }
}

/// `(week_id, member_id)` of one stored answer.
pub fn answer(week_id: Uuid, member_id: Uuid) -> (Uuid, Uuid) {
    (week_id, member_id)
}

#[derive(Default)]
pub struct MemoryStore {
    pub groups: Vec<Group>,
    pub members: Vec<Member>,
    pub weeks: Vec<Week>,
    pub answers: Vec<(Uuid, Uuid)>,
    pub subscriptions: Vec<PushSubscription>,
    /// Groups whose member lookup fails with a store error.
    pub broken_groups: Vec<Uuid>,
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn find_week(&self, week_id: Uuid) -> Result<Option<Week>> {
        Ok(self.weeks.iter().find(|w| w.id == week_id).cloned())
    }

    async fn find_group(&self, group_id: Uuid) -> Result<Option<Group>> {
        Ok(self.groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>> {
        Ok(self.members.iter().find(|m| m.id == member_id).cloned())
    }

    async fn group_member_ids(&self, group_id: Uuid) -> Result<Vec<Uuid>> {
        if self.broken_groups.contains(&group_id) {
            return Err(anyhow!("connection reset"));
        }
        Ok(self
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.id)
            .collect())
    }

    async fn answered_member_ids(&self, week_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .answers
            .iter()
            .filter(|(week, _)| *week == week_id)
            .map(|(_, member)| *member)
            .collect())
    }

    async fn subscriptions_for_members(&self, member_ids: &[Uuid]) -> Result<Vec<PushSubscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| member_ids.contains(&s.member_id))
            .cloned()
            .collect())
    }

    async fn active_weeks(&self) -> Result<Vec<Week>> {
        Ok(self
            .weeks
            .iter()
            .filter(|w| w.status == WeekStatus::Active)
            .cloned()
            .collect())
    }

    async fn weeks_due_for_reveal(&self, now: DateTime<Utc>) -> Result<Vec<Week>> {
        Ok(self
            .weeks
            .iter()
            .filter(|w| w.status == WeekStatus::Active && w.reveals_at.map(|at| at <= now).unwrap_or(false))
            .cloned()
            .collect())
    }
}

/// Endpoints containing `/fail/` are rejected, `/slow/` ones answer late.
#[derive(Default)]
pub struct ScriptedTransport {
    sent: Mutex<Vec<(Uuid, Notification)>>,
}

impl ScriptedTransport {
    pub fn sent(&self) -> Vec<(Uuid, Notification)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn delivered_to(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.sent().into_iter().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn send(&self, subscription: &PushSubscription, message: &Notification) -> Result<(), DeliveryError> {
        let endpoint = subscription.endpoint().ok_or(DeliveryError::MissingEndpoint)?;
        if endpoint.contains("/slow/") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if endpoint.contains("/fail/") {
            return Err(DeliveryError::Rejected(reqwest::StatusCode::GONE));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscription.member_id, message.clone()));
        Ok(())
    }
}
