//! Trigger runners. Each one loads fresh state from the store, asks the
//! matching rule in `domain::triggers` whether to notify, and hands the
//! message to the shared dispatcher. They keep no state of their own, so the
//! HTTP hooks and the cron sweeps can call them interchangeably.

use crate::db::NotificationStore;
use crate::domain::models::{Week, WeekStatus};
use crate::domain::reveal::{self, RevealState};
use crate::domain::schedule::{self, PlannedWeek, WeeklySchedule};
use crate::domain::triggers;
use crate::error::NotifyError;
use crate::services::dispatcher::{DispatchOutcome, DispatchRequest, Dispatcher};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Row-change notification as delivered by the store's webhooks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeEvent {
    #[serde(default)]
    pub record: Option<serde_json::Value>,
    #[serde(default)]
    pub old_record: Option<serde_json::Value>,
}

impl ChangeEvent {
    fn record<T: DeserializeOwned>(&self) -> Result<T, NotifyError> {
        let raw = self
            .record
            .clone()
            .ok_or_else(|| NotifyError::MalformedEvent("no record".to_string()))?;
        serde_json::from_value(raw).map_err(|e| NotifyError::MalformedEvent(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct WeekRecord {
    id: Uuid,
    group_id: Uuid,
    status: String,
    question: String,
}

#[derive(Debug, Deserialize)]
struct AnswerRecord {
    week_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    week_id: Uuid,
    member_id: Uuid,
    text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TriggerOutcome {
    Skipped { reason: String },
    Dispatched(DispatchOutcome),
}

impl TriggerOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        TriggerOutcome::Skipped { reason: reason.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SweepReport {
    pub weeks_considered: usize,
    pub weeks_notified: usize,
    pub weeks_failed: usize,
    pub delivery: DispatchOutcome,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekReveal {
    pub week_id: Uuid,
    pub answered: usize,
    pub total_members: usize,
    #[serde(flatten)]
    pub state: RevealState,
}

#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn NotificationStore>,
    dispatcher: Dispatcher,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn NotificationStore>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn load_week(&self, week_id: Uuid) -> Result<Week, NotifyError> {
        self.store
            .find_week(week_id)
            .await?
            .ok_or_else(|| NotifyError::NotFound(format!("week {}", week_id)))
    }

    pub async fn on_week_updated(&self, event: &ChangeEvent) -> Result<TriggerOutcome, NotifyError> {
        let record: WeekRecord = event.record()?;
        let Ok(new_status) = WeekStatus::try_from(record.status.as_str()) else {
            tracing::debug!("Week {} moved to unrecognised status {:?}", record.id, record.status);
            return Ok(TriggerOutcome::skipped(format!("unrecognised status {:?}", record.status)));
        };
        let old_status = event
            .old_record
            .as_ref()
            .and_then(|old| old.get("status"))
            .and_then(|s| s.as_str())
            .and_then(|s| WeekStatus::try_from(s).ok());

        let Some(message) = triggers::new_drop(old_status, new_status, record.id, &record.question) else {
            return Ok(TriggerOutcome::skipped("status not changed to active"));
        };

        tracing::info!("Week {} dropped, notifying group {}", record.id, record.group_id);
        let outcome = self
            .dispatcher
            .dispatch(&DispatchRequest::to_group(record.group_id, message))
            .await?;
        Ok(TriggerOutcome::Dispatched(outcome))
    }

    pub async fn on_answer_inserted(&self, event: &ChangeEvent) -> Result<TriggerOutcome, NotifyError> {
        let record: AnswerRecord = event.record()?;
        let week = self.load_week(record.week_id).await?;

        let total_members = self.store.group_member_ids(week.group_id).await?.len();
        let answered = self.store.answered_member_ids(week.id).await?.len();
        tracing::info!("Week {}: {}/{} answered", week.id, answered, total_members);

        let Some(message) = triggers::all_answered(week.id, answered, total_members) else {
            return Ok(TriggerOutcome::skipped(format!(
                "not all answered yet ({}/{})",
                answered, total_members
            )));
        };

        let outcome = self
            .dispatcher
            .dispatch(&DispatchRequest::to_group(week.group_id, message))
            .await?;
        Ok(TriggerOutcome::Dispatched(outcome))
    }

    pub async fn on_comment_inserted(&self, event: &ChangeEvent) -> Result<TriggerOutcome, NotifyError> {
        let record: CommentRecord = event.record()?;
        let week = self.load_week(record.week_id).await?;
        let commenter = self.store.find_member(record.member_id).await?;
        if commenter.is_none() {
            tracing::warn!("Commenter {} not found, using generic title", record.member_id);
        }

        let message = triggers::new_comment(week.id, commenter.as_ref(), &record.text);
        let request = DispatchRequest::to_group(week.group_id, message).excluding(record.member_id);
        let outcome = self.dispatcher.dispatch(&request).await?;
        Ok(TriggerOutcome::Dispatched(outcome))
    }

    /// Broadcasts "results revealed" for every active week whose reveal time
    /// has passed. Members who already saw results through the all-answered
    /// path are notified again.
    pub async fn reveal_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, NotifyError> {
        let weeks = self.store.weeks_due_for_reveal(now).await?;
        let mut report = SweepReport {
            weeks_considered: weeks.len(),
            ..SweepReport::default()
        };
        if weeks.is_empty() {
            tracing::debug!("No questions to reveal");
            return Ok(report);
        }
        tracing::info!("Found {} questions to reveal", weeks.len());

        for week in weeks.iter().filter(|w| triggers::due_for_reveal(w, now)) {
            let request = DispatchRequest::to_group(week.group_id, triggers::results_revealed(week));
            match self.dispatcher.dispatch(&request).await {
                Ok(outcome) => {
                    report.weeks_notified += 1;
                    report.delivery.absorb(outcome);
                    tracing::info!("Sent reveal notification for week {}", week.id);
                }
                Err(e) => {
                    report.weeks_failed += 1;
                    tracing::warn!("Reveal notification for week {} failed: {}", week.id, e);
                }
            }
        }
        Ok(report)
    }

    /// Nudges members who have not answered an active week yet.
    pub async fn reminder_sweep(&self) -> Result<SweepReport, NotifyError> {
        let weeks = self.store.active_weeks().await?;
        let mut report = SweepReport {
            weeks_considered: weeks.len(),
            ..SweepReport::default()
        };

        for week in &weeks {
            match self.remind_week(week).await {
                Ok(Some(outcome)) => {
                    report.weeks_notified += 1;
                    report.delivery.absorb(outcome);
                    tracing::info!(
                        "Sent {} reminders for week {} ({} failed)",
                        outcome.success_count,
                        week.id,
                        outcome.failure_count
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    report.weeks_failed += 1;
                    tracing::warn!("Reminders for week {} failed: {}", week.id, e);
                }
            }
        }
        Ok(report)
    }

    async fn remind_week(&self, week: &Week) -> Result<Option<DispatchOutcome>, NotifyError> {
        let member_ids = self.store.group_member_ids(week.group_id).await?;
        if member_ids.is_empty() {
            return Ok(None);
        }
        let answered = self.store.answered_member_ids(week.id).await?;
        let unanswered = triggers::unanswered_members(&member_ids, &answered);
        if unanswered.is_empty() {
            return Ok(None);
        }

        let request = DispatchRequest::to_group(week.group_id, triggers::reminder(week)).only(unanswered);
        self.dispatcher.dispatch(&request).await.map(Some)
    }

    pub async fn reveal_state(&self, week_id: Uuid, now: DateTime<Utc>) -> Result<WeekReveal, NotifyError> {
        let week = self.load_week(week_id).await?;
        let total_members = self.store.group_member_ids(week.group_id).await?.len();
        let answered = self.store.answered_member_ids(week.id).await?.len();
        Ok(WeekReveal {
            week_id: week.id,
            answered,
            total_members,
            state: reveal::evaluate(week.reveals_at, answered, total_members, now),
        })
    }

    pub async fn next_schedule(&self, group_id: Uuid, now: DateTime<Utc>) -> Result<PlannedWeek, NotifyError> {
        let group = self
            .store
            .find_group(group_id)
            .await?
            .ok_or_else(|| NotifyError::NotFound(format!("group {}", group_id)))?;
        Ok(schedule::plan_week(&WeeklySchedule::from_group(&group), None, None, now))
    }
}
