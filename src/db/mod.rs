use crate::domain::models::{Group, Member, PushSubscription, QuestionType, Week, WeekStatus};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Read access to the hosted game tables. Every call hits the store; nothing
/// is cached between invocations because membership can change at any time.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_week(&self, week_id: Uuid) -> Result<Option<Week>>;
    async fn find_group(&self, group_id: Uuid) -> Result<Option<Group>>;
    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>>;
    async fn group_member_ids(&self, group_id: Uuid) -> Result<Vec<Uuid>>;
    async fn answered_member_ids(&self, week_id: Uuid) -> Result<Vec<Uuid>>;
    async fn subscriptions_for_members(&self, member_ids: &[Uuid]) -> Result<Vec<PushSubscription>>;
    async fn active_weeks(&self) -> Result<Vec<Week>>;
    async fn weeks_due_for_reveal(&self, now: DateTime<Utc>) -> Result<Vec<Week>>;
}

#[derive(Debug, FromRow)]
struct WeekRow {
    id: Uuid,
    group_id: Uuid,
    week_number: i32,
    question_type: String,
    question: String,
    option_a: Option<String>,
    option_b: Option<String>,
    correct_answer: Option<String>,
    items: Option<String>,
    status: String,
    drops_at: Option<DateTime<Utc>>,
    reveals_at: Option<DateTime<Utc>>,
}

impl TryFrom<WeekRow> for Week {
    type Error = anyhow::Error;

    fn try_from(row: WeekRow) -> Result<Self> {
        let question_type = QuestionType::try_from(row.question_type.as_str())
            .map_err(|_| anyhow!("week {} has unknown type {:?}", row.id, row.question_type))?;
        let status = WeekStatus::try_from(row.status.as_str())
            .map_err(|_| anyhow!("week {} has unknown status {:?}", row.id, row.status))?;
        Ok(Week {
            id: row.id,
            group_id: row.group_id,
            week_number: row.week_number,
            question_type,
            question: row.question,
            option_a: row.option_a,
            option_b: row.option_b,
            correct_answer: row.correct_answer,
            items: row.items,
            status,
            drops_at: row.drops_at,
            reveals_at: row.reveals_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    emoji: String,
    is_curator: bool,
    phone: Option<String>,
    user_id: Option<Uuid>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            emoji: row.emoji,
            is_curator: row.is_curator,
            phone: row.phone,
            user_id: row.user_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    drop_day: Option<String>,
    drop_time: Option<String>,
    reveal_day: Option<String>,
    reveal_time: Option<String>,
    timezone: Option<String>,
}

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: Uuid,
    member_id: Uuid,
    subscription: serde_json::Value,
}

const WEEK_COLUMNS: &str = r#"
    id,
    group_id,
    week_number,
    type AS question_type,
    question,
    option_a,
    option_b,
    correct_answer,
    items,
    status,
    drops_at,
    reveals_at
"#;

/// Rows with values this service does not understand are skipped so one bad
/// week cannot stall a sweep over every group.
fn decode_weeks(rows: Vec<WeekRow>) -> Vec<Week> {
    rows.into_iter()
        .filter_map(|row| match Week::try_from(row) {
            Ok(week) => Some(week),
            Err(e) => {
                tracing::warn!("Skipping undecodable week: {}", e);
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn find_week(&self, week_id: Uuid) -> Result<Option<Week>> {
        let row = sqlx::query_as::<_, WeekRow>(&format!("SELECT {WEEK_COLUMNS} FROM weeks WHERE id = $1"))
            .bind(week_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Week::try_from).transpose()
    }

    async fn find_group(&self, group_id: Uuid) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT
                id,
                name,
                drop_day,
                drop_time::TEXT AS drop_time,
                reveal_day,
                reveal_time::TEXT AS reveal_time,
                timezone
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| Group {
            id: r.id,
            name: r.name,
            drop_day: r.drop_day,
            drop_time: r.drop_time,
            reveal_day: r.reveal_day,
            reveal_time: r.reveal_time,
            timezone: r.timezone,
        }))
    }

    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, group_id, name, emoji, is_curator, phone, user_id
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Member::from))
    }

    async fn group_member_ids(&self, group_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM members
            WHERE group_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn answered_member_ids(&self, week_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT member_id
            FROM answers
            WHERE week_id = $1
            "#,
        )
        .bind(week_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn subscriptions_for_members(&self, member_ids: &[Uuid]) -> Result<Vec<PushSubscription>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, member_id, subscription
            FROM push_subscriptions
            WHERE member_id = ANY($1)
            "#,
        )
        .bind(member_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| PushSubscription {
                id: r.id,
                member_id: r.member_id,
                subscription: r.subscription,
            })
            .collect())
    }

    async fn active_weeks(&self) -> Result<Vec<Week>> {
        let rows = sqlx::query_as::<_, WeekRow>(&format!(
            "SELECT {WEEK_COLUMNS} FROM weeks WHERE status = $1 ORDER BY group_id, week_number"
        ))
        .bind(WeekStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(decode_weeks(rows))
    }

    async fn weeks_due_for_reveal(&self, now: DateTime<Utc>) -> Result<Vec<Week>> {
        let rows = sqlx::query_as::<_, WeekRow>(&format!(
            "SELECT {WEEK_COLUMNS} FROM weeks WHERE status = $1 AND reveals_at <= $2 ORDER BY reveals_at"
        ))
        .bind(WeekStatus::Active.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(decode_weeks(rows))
    }
}
