//! xsd:date / xsd:dateTime lexical forms to epoch milliseconds

use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time, UtcOffset};

/// Parses `yyyy-MM-dd[THH[:mm[:ss[.fff]]]][Z|±hh:mm]`. No offset means UTC.
pub fn parse_date_millis(lexical: &str) -> Option<i64> {
    let lexical = lexical.trim();
    let (date_part, rest) = lexical.split_at_checked(10)?;
    let date = Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()?;

    let (clock, zone) = match rest.strip_prefix('T') {
        Some(rest) => split_zone(rest),
        None => ("", rest),
    };
    let time = parse_clock(clock)?;
    let offset = parse_zone(zone)?;

    let millis = PrimitiveDateTime::new(date, time)
        .assume_offset(offset)
        .unix_timestamp_nanos()
        / 1_000_000;
    i64::try_from(millis).ok()
}

fn split_zone(value: &str) -> (&str, &str) {
    match value.find(['Z', '+', '-']) {
        Some(index) => value.split_at(index),
        None => (value, ""),
    }
}

fn parse_clock(clock: &str) -> Option<Time> {
    if clock.is_empty() {
        return Some(Time::MIDNIGHT);
    }
    let mut parts = clock.split(':');
    let hour: u8 = parts.next()?.parse().ok()?;
    let minute: u8 = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    let (second, milli) = match parts.next() {
        None => (0, 0),
        Some(seconds) => parse_seconds(seconds)?,
    };
    if parts.next().is_some() {
        return None;
    }
    // 24:00:00 is end of day, which only the next day can represent
    if hour == 24 {
        return None;
    }
    Time::from_hms_milli(hour, minute, second, milli).ok()
}

fn parse_seconds(seconds: &str) -> Option<(u8, u16)> {
    match seconds.split_once('.') {
        None => Some((seconds.parse().ok()?, 0)),
        Some((whole, fraction)) => {
            if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let digits: String = fraction.chars().chain("00".chars()).take(3).collect();
            Some((whole.parse().ok()?, digits.parse().ok()?))
        }
    }
}

fn parse_zone(zone: &str) -> Option<UtcOffset> {
    match zone {
        "" | "Z" => Some(UtcOffset::UTC),
        _ => {
            let (sign, rest) = zone.split_at_checked(1)?;
            let (hours, minutes) = rest.split_once(':')?;
            let hours: i8 = hours.parse().ok()?;
            let minutes: i8 = minutes.parse().ok()?;
            let (hours, minutes) = match sign {
                "+" => (hours, minutes),
                "-" => (-hours, -minutes),
                _ => return None,
            };
            UtcOffset::from_hms(hours, minutes, 0).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_only() {
        assert_eq!(parse_date_millis("1970-01-01"), Some(0));
        assert_eq!(parse_date_millis("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_date_millis("1970-01-02Z"), Some(86_400_000));
    }

    #[test]
    fn test_partial_and_full_times() {
        assert_eq!(parse_date_millis("1970-01-01T01"), Some(3_600_000));
        assert_eq!(parse_date_millis("1970-01-01T01:01"), Some(3_660_000));
        assert_eq!(parse_date_millis("1970-01-01T00:00:01"), Some(1_000));
        assert_eq!(parse_date_millis("1970-01-01T00:00:01.5"), Some(1_500));
        assert_eq!(parse_date_millis("1970-01-01T00:00:01.25Z"), Some(1_250));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(parse_date_millis("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_date_millis("1969-12-31T23:00:00-01:00"), Some(0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_date_millis("yesterday"), None);
        assert_eq!(parse_date_millis("2020-13-01"), None);
        assert_eq!(parse_date_millis("2020-01-01T25:00"), None);
        assert_eq!(parse_date_millis("2020-01-01T10:00:00+5"), None);
        assert_eq!(parse_date_millis("2020-01-01junk"), None);
    }
}
