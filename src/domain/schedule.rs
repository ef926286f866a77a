use crate::domain::models::Group;
use crate::time_utils::{self, GroupTimezone};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::Serialize;

/// Length of one schedule cycle.
pub const CYCLE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy)]
pub struct WeeklySchedule {
    pub drop_day: Weekday,
    pub drop_time: NaiveTime,
    pub reveal_day: Weekday,
    pub reveal_time: NaiveTime,
    pub timezone: GroupTimezone,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            drop_day: Weekday::Sun,
            drop_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            reveal_day: Weekday::Wed,
            reveal_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            timezone: GroupTimezone::utc(),
        }
    }
}

impl WeeklySchedule {
    /// Reads a group's schedule columns, keeping the default for anything
    /// missing or unparseable.
    pub fn from_group(group: &Group) -> Self {
        let defaults = Self::default();

        fn field<T>(
            group: &Group,
            name: &str,
            raw: Option<&str>,
            parse: impl Fn(&str) -> Option<T>,
            fallback: T,
        ) -> T {
            match raw {
                None => fallback,
                Some(value) => parse(value).unwrap_or_else(|| {
                    tracing::warn!("Group {} has invalid {} {:?}, using default", group.id, name, value);
                    fallback
                }),
            }
        }

        Self {
            drop_day: field(group, "drop_day", group.drop_day.as_deref(), time_utils::parse_weekday, defaults.drop_day),
            drop_time: field(group, "drop_time", group.drop_time.as_deref(), time_utils::parse_clock, defaults.drop_time),
            reveal_day: field(
                group,
                "reveal_day",
                group.reveal_day.as_deref(),
                time_utils::parse_weekday,
                defaults.reveal_day,
            ),
            reveal_time: field(
                group,
                "reveal_time",
                group.reveal_time.as_deref(),
                time_utils::parse_clock,
                defaults.reveal_time,
            ),
            timezone: field(group, "timezone", group.timezone.as_deref(), time_utils::parse_timezone, defaults.timezone),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlannedWeek {
    pub drops_at: DateTime<Utc>,
    pub reveals_at: DateTime<Utc>,
}

/// Next `day` at `time` in the group's timezone. The current weekday always
/// resolves to next week, even when `time` is still ahead today.
pub fn next_occurrence(
    day: Weekday,
    time: NaiveTime,
    timezone: GroupTimezone,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let local_now = timezone.local_datetime(now);
    let current = local_now.weekday().num_days_from_sunday() as i64;
    let target = day.num_days_from_sunday() as i64;

    let mut days_until = target - current;
    if days_until <= 0 {
        days_until += CYCLE_DAYS;
    }

    let date = local_now.date() + Duration::days(days_until);
    timezone.to_utc(date.and_time(time))
}

/// Default drop and reveal timestamps for a new week. Explicit overrides win;
/// a reveal that does not land after the drop moves one cycle later.
pub fn plan_week(
    schedule: &WeeklySchedule,
    drop_override: Option<DateTime<Utc>>,
    reveal_override: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> PlannedWeek {
    let drops_at = drop_override
        .unwrap_or_else(|| next_occurrence(schedule.drop_day, schedule.drop_time, schedule.timezone, now));
    let mut reveals_at = reveal_override.unwrap_or_else(|| {
        next_occurrence(schedule.reveal_day, schedule.reveal_time, schedule.timezone, now)
    });

    if reveals_at <= drops_at {
        reveals_at += Duration::days(CYCLE_DAYS);
    }

    PlannedWeek { drops_at, reveals_at }
}
