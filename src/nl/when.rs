//! Time-expression resolution.
//!
//! Turns a time expression found by the slot extractor into an absolute due
//! instant relative to `now`:
//!
//! | Expression                          | Due                                   |
//! |-------------------------------------|---------------------------------------|
//! | `in N <unit>`, `N <unit> from now`  | now + N units (minutes/hours/days/weeks) |
//! | `tomorrow`                          | now + 1 day                           |
//! | `next week`                         | now + 7 days                          |
//! | `today`                             | 18:00 today, or now + 1 hour if past  |
//! | `3:30pm`, `7 am`, `14:00`           | next occurrence of that clock time    |
//! | `morning` / `afternoon` / `evening` / `night`, `tonight` | next 09:00 / 14:00 / 18:00 / 21:00 |
//! | anything else, or none              | now + 1 day                           |

use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_DAYS: i64 = 1;

struct Patterns {
    offset: Regex,
    from_now: Regex,
    clock: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        offset: Regex::new(r"^in (\d+)\s*([a-z]+)$").expect("offset pattern must compile"),
        from_now: Regex::new(r"^(\d+)\s*([a-z]+)\s*from now$").expect("from-now pattern must compile"),
        clock: Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*([ap]m)?$").expect("clock pattern must compile"),
    })
}

/// Resolve `expr` against `now`. Unrecognized input gets the one-day default.
pub fn resolve_due(expr: Option<&str>, now: NaiveDateTime) -> NaiveDateTime {
    let default = || now + Duration::days(DEFAULT_DAYS);
    let Some(expr) = expr else {
        return default();
    };
    let expr = expr.trim().to_lowercase();

    let resolved = match expr.as_str() {
        "tomorrow" => now.checked_add_signed(Duration::days(1)),
        "next week" => now.checked_add_signed(Duration::days(7)),
        "today" => Some(today(now)),
        "morning" | "this morning" => next_at(now, 9, 0),
        "afternoon" | "this afternoon" => next_at(now, 14, 0),
        "evening" | "this evening" => next_at(now, 18, 0),
        "night" | "tonight" => next_at(now, 21, 0),
        other => offset(other, now).or_else(|| clock(other, now)),
    };

    resolved.unwrap_or_else(|| {
        log::debug!("no resolution for time expression '{}', using default", expr);
        default()
    })
}

fn today(now: NaiveDateTime) -> NaiveDateTime {
    match NaiveTime::from_hms_opt(18, 0, 0).map(|t| now.date().and_time(t)) {
        Some(evening) if evening > now => evening,
        _ => now + Duration::hours(1),
    }
}

fn offset(expr: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let p = patterns();
    let caps = p.offset.captures(expr).or_else(|| p.from_now.captures(expr))?;
    let n: i64 = caps[1].parse().ok()?;
    let delta = match caps[2].trim_end_matches('s') {
        "minute" | "min" => Duration::try_minutes(n),
        "hour" => Duration::try_hours(n),
        "day" => Duration::try_days(n),
        "week" => Duration::try_weeks(n),
        _ => None,
    }?;
    now.checked_add_signed(delta)
}

fn clock(expr: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = patterns().clock.captures(expr)?;
    // A bare number ("3") is not a clock time.
    if caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour %= 12;
            if meridiem == "pm" {
                hour += 12;
            }
        }
        None if hour > 23 => return None,
        None => {}
    }
    next_at(now, hour, minute)
}

/// The next instant strictly after `now` with the given wall-clock time.
fn next_at(now: NaiveDateTime, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let candidate = now.date().and_time(time);
    if candidate > now {
        Some(candidate)
    } else {
        candidate.checked_add_signed(Duration::days(1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn on(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_none_defaults_to_one_day() {
        assert_eq!(resolve_due(None, at(10, 0)), on(11, 10, 0));
    }

    #[test]
    fn test_unrecognized_defaults_to_one_day() {
        assert_eq!(resolve_due(Some("whenever"), at(10, 0)), on(11, 10, 0));
    }

    #[test]
    fn test_in_n_units() {
        let now = at(10, 0);
        assert_eq!(resolve_due(Some("in 30 minutes"), now), at(10, 30));
        assert_eq!(resolve_due(Some("in 5 mins"), now), at(10, 5));
        assert_eq!(resolve_due(Some("in 1 hour"), now), at(11, 0));
        assert_eq!(resolve_due(Some("in 3 days"), now), on(13, 10, 0));
        assert_eq!(resolve_due(Some("in 2 weeks"), now), on(24, 10, 0));
    }

    #[test]
    fn test_from_now() {
        assert_eq!(resolve_due(Some("2 hours from now"), at(10, 0)), at(12, 0));
        assert_eq!(resolve_due(Some("1 day from now"), at(10, 0)), on(11, 10, 0));
    }

    #[test]
    fn test_huge_offset_falls_back() {
        let now = at(10, 0);
        assert_eq!(resolve_due(Some("in 99999999999 weeks"), now), on(11, 10, 0));
    }

    #[test]
    fn test_tomorrow_and_next_week() {
        assert_eq!(resolve_due(Some("tomorrow"), at(8, 15)), on(11, 8, 15));
        assert_eq!(resolve_due(Some("next week"), at(8, 15)), on(17, 8, 15));
    }

    #[test]
    fn test_today() {
        assert_eq!(resolve_due(Some("today"), at(9, 0)), at(18, 0));
        assert_eq!(resolve_due(Some("today"), at(19, 0)), at(20, 0));
    }

    #[test]
    fn test_clock_times() {
        let now = at(10, 0);
        assert_eq!(resolve_due(Some("3:30 pm"), now), at(15, 30));
        assert_eq!(resolve_due(Some("7am"), now), on(11, 7, 0));
        assert_eq!(resolve_due(Some("14:00"), now), at(14, 0));
        assert_eq!(resolve_due(Some("12am"), now), on(11, 0, 0));
        assert_eq!(resolve_due(Some("12pm"), now), at(12, 0));
    }

    #[test]
    fn test_invalid_clock_falls_back() {
        let now = at(10, 0);
        assert_eq!(resolve_due(Some("25:00"), now), on(11, 10, 0));
        assert_eq!(resolve_due(Some("13pm"), now), on(11, 10, 0));
        assert_eq!(resolve_due(Some("9:75"), now), on(11, 10, 0));
    }

    #[test]
    fn test_time_of_day_words() {
        let now = at(10, 0);
        assert_eq!(resolve_due(Some("morning"), now), on(11, 9, 0));
        assert_eq!(resolve_due(Some("this afternoon"), now), at(14, 0));
        assert_eq!(resolve_due(Some("evening"), now), at(18, 0));
        assert_eq!(resolve_due(Some("tonight"), now), at(21, 0));
        assert_eq!(resolve_due(Some("night"), at(22, 0)), on(11, 21, 0));
    }

    #[test]
    fn test_case_and_whitespace_ignored() {
        assert_eq!(resolve_due(Some("  In 2 Days "), at(10, 0)), on(12, 10, 0));
    }
}
