use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const MINUTES_PER_DAY: i64 = 24 * 60;
const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

static TWELVE_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)$").expect("valid regex"));

static TWENTY_FOUR_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0+(:0+){0,2}(am|pm)?$").expect("valid regex"));

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Minutes since midnight for a free-text time of day: "14:30", "2:30 PM",
/// or an ISO datetime. `None` for anything else, including out-of-range
/// values such as "25:00".
pub fn parse_time_to_minutes(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = TWELVE_HOUR_RE.captures(text) {
        let hour: i64 = caps[1].parse().ok()?;
        let minute: i64 = caps[2].parse().ok()?;
        if hour > 12 || minute > 59 {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return Some(hour * 60 + minute);
    }

    if let Some(caps) = TWENTY_FOUR_HOUR_RE.captures(text) {
        let hour: i64 = caps[1].parse().ok()?;
        let minute: i64 = caps[2].parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        return Some(hour * 60 + minute);
    }

    parse_datetime(text).map(|t| i64::from(t.hour()) * 60 + i64::from(t.minute()))
}

fn parse_datetime(text: &str) -> Option<NaiveTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.time());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.time());
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S").ok()
}

/// Values the admin UI leaves behind when no time was entered: blank,
/// "TBD", or a zero time such as "00", "0:00", "00:00:00" or "00:00 AM".
pub fn is_placeholder_time(text: &str) -> bool {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    compact.is_empty() || compact == "tbd" || PLACEHOLDER_RE.is_match(&compact)
}

/// Minutes of a non-placeholder time string, if it parses.
pub fn usable_minutes(text: &str) -> Option<i64> {
    if is_placeholder_time(text) {
        None
    } else {
        parse_time_to_minutes(text)
    }
}

/// Current minute of the day in India Standard Time.
pub fn kerala_now_minutes() -> i64 {
    let now = (Utc::now() + TimeDelta::seconds(IST_OFFSET_SECS)).time();
    i64::from(now.hour()) * 60 + i64::from(now.minute())
}

/// Formats minutes since midnight as "H:MM AM". Wraps outside one day.
pub fn minutes_to_time_string(minutes: i64) -> String {
    let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
    let hour = minutes / 60;
    let minute = minutes % 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_twelve_hour_clock() {
        assert_eq!(parse_time_to_minutes("08:05 AM"), Some(485));
        assert_eq!(parse_time_to_minutes("8:05am"), Some(485));
        assert_eq!(parse_time_to_minutes("12:00 AM"), Some(0));
        assert_eq!(parse_time_to_minutes("12:30 PM"), Some(750));
        assert_eq!(parse_time_to_minutes("11:59 pm"), Some(1439));
    }

    #[test]
    fn parses_twenty_four_hour_clock() {
        assert_eq!(parse_time_to_minutes("14:30"), Some(870));
        assert_eq!(parse_time_to_minutes("9:00"), Some(540));
        assert_eq!(parse_time_to_minutes("  00:00 "), Some(0));
    }

    #[test]
    fn parses_datetimes() {
        assert_eq!(parse_time_to_minutes("2024-05-01T07:45:00+05:30"), Some(465));
        assert_eq!(parse_time_to_minutes("2024-05-01T18:10"), Some(1090));
        assert_eq!(parse_time_to_minutes("06:20:15"), Some(380));
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert_eq!(parse_time_to_minutes(""), None);
        assert_eq!(parse_time_to_minutes("   "), None);
        assert_eq!(parse_time_to_minutes("soon"), None);
        assert_eq!(parse_time_to_minutes("25:00"), None);
        assert_eq!(parse_time_to_minutes("13:00 PM"), None);
    }

    #[test]
    fn classifies_placeholders() {
        for text in ["", "00", "0:00", "00:00", "00:00:00", "00am", "TBD", "tbd", "00:00 am"] {
            assert!(is_placeholder_time(text), "{:?} should be a placeholder", text);
        }
        for text in ["08:05 AM", "14:30", "12:00 AM"] {
            assert!(!is_placeholder_time(text), "{:?} should not be a placeholder", text);
        }
    }

    #[test]
    fn usable_minutes_skips_placeholders() {
        assert_eq!(usable_minutes("00:00"), None);
        assert_eq!(usable_minutes("00:00:00"), None);
        assert_eq!(usable_minutes("14:30"), Some(870));
    }

    #[test]
    fn current_minute_is_within_a_day() {
        assert!((0..MINUTES_PER_DAY).contains(&kerala_now_minutes()));
    }

    #[test]
    fn formats_and_wraps() {
        assert_eq!(minutes_to_time_string(0), "12:00 AM");
        assert_eq!(minutes_to_time_string(485), "8:05 AM");
        assert_eq!(minutes_to_time_string(750), "12:30 PM");
        assert_eq!(minutes_to_time_string(1440 + 61), "1:01 AM");
        assert_eq!(minutes_to_time_string(-1), "11:59 PM");
    }

    #[test]
    fn formatting_round_trips_through_parsing() {
        for m in 0..MINUTES_PER_DAY {
            assert_eq!(parse_time_to_minutes(&minutes_to_time_string(m)), Some(m));
        }
    }
}
