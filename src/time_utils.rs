use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Clone, Copy, Debug)]
pub enum GroupTimezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl GroupTimezone {
    pub fn utc() -> Self {
        GroupTimezone::Named(Tz::UTC)
    }

    pub fn local_datetime(&self, utc_dt: DateTime<Utc>) -> NaiveDateTime {
        match self {
            GroupTimezone::Named(tz) => utc_dt.with_timezone(tz).naive_local(),
            GroupTimezone::Fixed(offset) => utc_dt.with_timezone(offset).naive_local(),
        }
    }

    /// Resolves a wall-clock time to UTC. Ambiguous times take the earlier
    /// instant; times skipped by a DST jump are read as one hour later.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let resolve = |dt: NaiveDateTime| match self {
            GroupTimezone::Named(tz) => tz
                .from_local_datetime(&dt)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
            GroupTimezone::Fixed(offset) => offset
                .from_local_datetime(&dt)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
        };
        resolve(local)
            .or_else(|| resolve(local + chrono::Duration::hours(1)))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }
}

/// Accepts `+02:00`, `-0530`, `+3` style offsets.
fn parse_fixed_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    let sign = match raw.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = raw[1..].trim();
    if !digits.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if digits.len() > 2 => {
            let (h, m) = digits.split_at(digits.len() - 2);
            (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?)
        }
        None => (digits.parse::<i32>().ok()?, 0),
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

pub fn parse_timezone(raw: &str) -> Option<GroupTimezone> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_uppercase();
    if upper == "UTC" || upper == "GMT" || upper == "Z" {
        return Some(GroupTimezone::utc());
    }
    if let Some(rest) = upper.strip_prefix("UTC").or_else(|| upper.strip_prefix("GMT")) {
        return parse_fixed_offset(rest).map(GroupTimezone::Fixed);
    }
    if let Some(offset) = parse_fixed_offset(trimmed) {
        return Some(GroupTimezone::Fixed(offset));
    }
    trimmed.parse::<Tz>().ok().map(GroupTimezone::Named)
}

pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    raw.trim().parse::<Weekday>().ok()
}

/// Parses `HH:MM`, also accepting the `HH:MM:SS` form Postgres emits for time columns.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone_variants() {
        assert!(matches!(parse_timezone("utc"), Some(GroupTimezone::Named(Tz::UTC))));
        assert!(matches!(parse_timezone("America/Chicago"), Some(GroupTimezone::Named(_))));
        match parse_timezone("GMT+05:30") {
            Some(GroupTimezone::Fixed(offset)) => assert_eq!(offset.local_minus_utc(), 19_800),
            other => panic!("unexpected {:?}", other),
        }
        match parse_timezone("-0800") {
            Some(GroupTimezone::Fixed(offset)) => assert_eq!(offset.local_minus_utc(), -28_800),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_timezone("Mars/Olympus").is_none());
        assert!(parse_timezone("  ").is_none());
    }

    #[test]
    fn test_non_ascii_offset_is_rejected() {
        assert!(parse_timezone("+éx").is_none());
        assert!(parse_timezone("-1é").is_none());
        assert!(parse_timezone("UTC+٠٥").is_none());
    }

    #[test]
    fn test_parse_clock_and_weekday() {
        assert_eq!(parse_clock("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("18:30:00"), NaiveTime::from_hms_opt(18, 30, 0));
        assert!(parse_clock("25:00").is_none());
        assert_eq!(parse_weekday("Wednesday"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("sunday"), Some(Weekday::Sun));
        assert!(parse_weekday("someday").is_none());
    }
}
