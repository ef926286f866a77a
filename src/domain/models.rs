use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Debate,
    HotTake,
    ThisOrThat,
    Trivia,
    Confession,
    FamilyPoll,
    RankThese,
    Prediction,
}

impl TryFrom<&str> for QuestionType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "debate" => Ok(QuestionType::Debate),
            "hot-take" => Ok(QuestionType::HotTake),
            "this-or-that" => Ok(QuestionType::ThisOrThat),
            "trivia" => Ok(QuestionType::Trivia),
            "confession" => Ok(QuestionType::Confession),
            "family-poll" | "group-poll" => Ok(QuestionType::FamilyPoll),
            "rank-these" => Ok(QuestionType::RankThese),
            "prediction" => Ok(QuestionType::Prediction),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeekStatus {
    Scheduled,
    Active,
    Archived,
}

impl WeekStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStatus::Scheduled => "scheduled",
            WeekStatus::Active => "active",
            WeekStatus::Archived => "archived",
        }
    }
}

impl TryFrom<&str> for WeekStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Ok(WeekStatus::Scheduled),
            "active" => Ok(WeekStatus::Active),
            "archived" => Ok(WeekStatus::Archived),
            _ => Err(()),
        }
    }
}

/// One round of the group game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Week {
    pub id: Uuid,
    pub group_id: Uuid,
    pub week_number: i32,
    pub question_type: QuestionType,
    pub question: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub correct_answer: Option<String>,
    /// JSON-encoded ordered list, used by rank-these.
    pub items: Option<String>,
    pub status: WeekStatus,
    pub drops_at: Option<DateTime<Utc>>,
    pub reveals_at: Option<DateTime<Utc>>,
}

impl Week {
    pub fn link(&self) -> String {
        question_link(self.id)
    }
}

pub fn question_link(week_id: Uuid) -> String {
    format!("/question/{}", week_id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub emoji: String,
    pub is_curator: bool,
    pub phone: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Browser push subscription. The descriptor is opaque apart from `endpoint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: Uuid,
    pub member_id: Uuid,
    pub subscription: serde_json::Value,
}

impl PushSubscription {
    pub fn endpoint(&self) -> Option<&str> {
        self.subscription.get("endpoint").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub drop_day: Option<String>,
    pub drop_time: Option<String>,
    pub reveal_day: Option<String>,
    pub reveal_time: Option<String>,
    pub timezone: Option<String>,
}

/// Title, body and in-app link of one push message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub url: String,
}
