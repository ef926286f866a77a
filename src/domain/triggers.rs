//! Decision rules for the lifecycle triggers. Every function here is pure:
//! callers fetch fresh state, ask whether a notification is warranted, and
//! hand the result to the dispatcher.

use crate::domain::models::{question_link, Member, Notification, Week, WeekStatus};
use crate::domain::reveal;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

pub const REMINDER_PROMPT_CHARS: usize = 60;
pub const COMMENT_PREVIEW_CHARS: usize = 100;

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fires only on the exact `scheduled -> active` transition.
pub fn new_drop(
    old_status: Option<WeekStatus>,
    new_status: WeekStatus,
    week_id: Uuid,
    question: &str,
) -> Option<Notification> {
    if old_status != Some(WeekStatus::Scheduled) || new_status != WeekStatus::Active {
        return None;
    }
    Some(Notification {
        title: "New Drop!".to_string(),
        body: question.to_string(),
        url: question_link(week_id),
    })
}

pub fn all_answered(week_id: Uuid, answer_count: usize, total_members: usize) -> Option<Notification> {
    if !reveal::all_answered(answer_count, total_members) {
        return None;
    }
    Some(Notification {
        title: "All answers are in!".to_string(),
        body: "Everyone has answered. Check out the results!".to_string(),
        url: question_link(week_id),
    })
}

pub fn due_for_reveal(week: &Week, now: DateTime<Utc>) -> bool {
    week.status == WeekStatus::Active && week.reveals_at.map(|at| at <= now).unwrap_or(false)
}

pub fn results_revealed(week: &Week) -> Notification {
    Notification {
        title: "Results Revealed!".to_string(),
        body: "See what everyone said!".to_string(),
        url: week.link(),
    }
}

/// Members that have not answered yet, in group order.
pub fn unanswered_members(member_ids: &[Uuid], answered: &[Uuid]) -> Vec<Uuid> {
    let answered: HashSet<&Uuid> = answered.iter().collect();
    member_ids
        .iter()
        .filter(|id| !answered.contains(id))
        .copied()
        .collect()
}

pub fn reminder(week: &Week) -> Notification {
    Notification {
        title: "Reminder".to_string(),
        body: format!(
            "Don't forget to answer: {}...",
            truncate_chars(&week.question, REMINDER_PROMPT_CHARS)
        ),
        url: week.link(),
    }
}

/// The commenter may have left the group; the title then falls back to a
/// generic author.
pub fn new_comment(week_id: Uuid, commenter: Option<&Member>, text: &str) -> Notification {
    let title = match commenter {
        Some(member) => format!("{} {} commented", member.emoji, member.name),
        None => "Someone commented".to_string(),
    };
    Notification {
        title,
        body: truncate_chars(text, COMMENT_PREVIEW_CHARS).to_string(),
        url: question_link(week_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::QuestionType;
    use chrono::Duration;

    fn week(status: WeekStatus, reveals_at: Option<DateTime<Utc>>, question: &str) -> Week {
        Week {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            week_number: 1,
            question_type: QuestionType::HotTake,
            question: question.to_string(),
            option_a: None,
            option_b: None,
            correct_answer: None,
            items: None,
            status,
            drops_at: None,
            reveals_at,
        }
    }

    #[test]
    fn test_new_drop_only_on_scheduled_to_active() {
        let id = Uuid::new_v4();
        let fired = new_drop(Some(WeekStatus::Scheduled), WeekStatus::Active, id, "Pineapple on pizza?")
            .expect("transition should fire");
        assert_eq!(fired.title, "New Drop!");
        assert_eq!(fired.body, "Pineapple on pizza?");
        assert_eq!(fired.url, format!("/question/{}", id));

        assert!(new_drop(Some(WeekStatus::Active), WeekStatus::Active, id, "q").is_none());
        assert!(new_drop(Some(WeekStatus::Active), WeekStatus::Archived, id, "q").is_none());
        assert!(new_drop(Some(WeekStatus::Scheduled), WeekStatus::Scheduled, id, "q").is_none());
        assert!(new_drop(None, WeekStatus::Active, id, "q").is_none());
    }

    #[test]
    fn test_all_answered_requires_members() {
        let id = Uuid::new_v4();
        assert!(all_answered(id, 0, 0).is_none());
        assert!(all_answered(id, 2, 3).is_none());
        assert!(all_answered(id, 4, 3).is_some());
        let fired = all_answered(id, 3, 3).expect("everyone answered");
        assert_eq!(fired.title, "All answers are in!");
    }

    #[test]
    fn test_due_for_reveal() {
        let now = Utc::now();
        assert!(due_for_reveal(&week(WeekStatus::Active, Some(now - Duration::minutes(1)), "q"), now));
        assert!(due_for_reveal(&week(WeekStatus::Active, Some(now), "q"), now));
        assert!(!due_for_reveal(&week(WeekStatus::Active, Some(now + Duration::hours(1)), "q"), now));
        assert!(!due_for_reveal(&week(WeekStatus::Active, None, "q"), now));
        assert!(!due_for_reveal(&week(WeekStatus::Archived, Some(now - Duration::days(2)), "q"), now));
    }

    #[test]
    fn test_unanswered_members_keeps_group_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(unanswered_members(&[a, b, c], &[a, c]), vec![b]);
        assert!(unanswered_members(&[a], &[a]).is_empty());
    }

    #[test]
    fn test_reminder_truncates_by_characters() {
        let prompt = "é".repeat(80);
        let fired = reminder(&week(WeekStatus::Active, None, &prompt));
        assert_eq!(fired.title, "Reminder");
        assert_eq!(fired.body, format!("Don't forget to answer: {}...", "é".repeat(60)));

        let short = reminder(&week(WeekStatus::Active, None, "Best sandwich?"));
        assert_eq!(short.body, "Don't forget to answer: Best sandwich?...");
    }

    #[test]
    fn test_new_comment_message() {
        let member = Member {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            name: "Grandma".to_string(),
            emoji: "🦉".to_string(),
            is_curator: false,
            phone: None,
            user_id: None,
        };
        let text = "x".repeat(150);
        let fired = new_comment(Uuid::new_v4(), Some(&member), &text);
        assert_eq!(fired.title, "🦉 Grandma commented");
        assert_eq!(fired.body.chars().count(), 100);

        let anonymous = new_comment(Uuid::new_v4(), None, "hi");
        assert_eq!(anonymous.title, "Someone commented");
        assert_eq!(anonymous.body, "hi");
    }
}
