use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RevealState {
    pub all_answered: bool,
    pub should_reveal: bool,
}

/// An empty group never counts as fully answered.
pub fn all_answered(answer_count: usize, total_members: usize) -> bool {
    total_members > 0 && answer_count >= total_members
}

/// Decides whether a week's results are visible.
///
/// A week without a reveal timestamp only reveals once every member has
/// answered.
pub fn evaluate(
    reveals_at: Option<DateTime<Utc>>,
    answer_count: usize,
    total_members: usize,
    now: DateTime<Utc>,
) -> RevealState {
    let all_answered = all_answered(answer_count, total_members);
    let time_elapsed = reveals_at.map(|at| now >= at).unwrap_or(false);

    RevealState {
        all_answered,
        should_reveal: all_answered || time_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_partial_answers_before_reveal_time() {
        let now = Utc::now();
        for total in 1..6 {
            for answered in 0..total {
                let state = evaluate(Some(now + Duration::hours(1)), answered, total, now);
                assert!(!state.should_reveal);
                assert!(!state.all_answered);
            }
        }
        let state = evaluate(None, 2, 3, now);
        assert!(!state.should_reveal);
    }

    #[test]
    fn test_all_answered_reveals_regardless_of_time() {
        let now = Utc::now();
        for reveals_at in [None, Some(now + Duration::days(3)), Some(now - Duration::days(1))] {
            let state = evaluate(reveals_at, 4, 4, now);
            assert!(state.all_answered);
            assert!(state.should_reveal);
        }
        assert!(evaluate(None, 5, 4, now).all_answered);
    }

    #[test]
    fn test_empty_group_is_never_all_answered() {
        let now = Utc::now();
        let state = evaluate(None, 0, 0, now);
        assert!(!state.all_answered);
        assert!(!state.should_reveal);

        let state = evaluate(Some(now), 0, 0, now);
        assert!(!state.all_answered);
        assert!(state.should_reveal);
        assert!(!all_answered(0, 0));
        assert!(all_answered(3, 3));
    }

    #[test]
    fn test_reveal_time_is_inclusive() {
        let now = Utc::now();
        assert!(evaluate(Some(now), 0, 3, now).should_reveal);
        assert!(!evaluate(Some(now + Duration::seconds(1)), 0, 3, now).should_reveal);
    }
}
