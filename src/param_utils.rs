use crate::access::QueryParams;
use crate::commands::params::{
    PARAMETER_FROM, PARAMETER_PAGE, PARAMETER_SIZE, PARAMETER_UNTIL, PARAMETER_VERSION,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::ArgMatches;
use crate::error_utils;

/// Wire format of date filters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot interpret {input:?} as a date")]
pub struct DateParseError {
    input: String,
}

fn number_word(word: &str) -> Option<&'static str> {
    let digits = match word {
        "a" | "an" | "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "ten" => "10",
        _ => return None,
    };
    Some(digits)
}

/// Parses the `<amount> <unit>` part of a relative phrase, e.g. `two hours` or `1h 30min`.
fn relative_offset(phrase: &str) -> Option<Duration> {
    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    if let Some(digits) = words.first().and_then(|word| number_word(word)) {
        words[0] = digits;
    }
    let offset = humantime::parse_duration(&words.join(" ")).ok()?;
    Duration::from_std(offset).ok()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Interprets a user supplied date relative to `now`.
///
/// Accepted are RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (UTC),
/// `now`, `today`, `yesterday` and phrases like `3 days ago`, `two hours ago` or
/// `1h 30min ago`.
pub fn parse_date(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateParseError> {
    let error = || DateParseError {
        input: input.to_string(),
    };
    let normalized = input.trim().to_lowercase();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input.trim()) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%dT%H:%M:%S") {
        return Ok(timestamp.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }

    match normalized.as_str() {
        "now" => return Ok(now),
        "today" => return Ok(start_of_day(now.date_naive())),
        "yesterday" => {
            let yesterday = now.date_naive().pred_opt().ok_or_else(error)?;
            return Ok(start_of_day(yesterday));
        }
        _ => {}
    }

    let phrase = normalized.strip_suffix(" ago").ok_or_else(error)?;
    let offset = relative_offset(phrase).ok_or_else(error)?;
    now.checked_sub_signed(offset).ok_or_else(error)
}

pub fn format_query_date(date: &DateTime<Utc>) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

/// clap value parser turning a date expression into its wire format.
pub fn query_date_value_parser(input: &str) -> Result<String, String> {
    parse_date(input, Utc::now())
        .map(|date| format_query_date(&date))
        .map_err(|e| e.to_string())
}

/// Version argument, only honoured for single-identifier lookups.
pub fn version_parameter_value(matches: &ArgMatches, identifiers: usize) -> Option<u64> {
    let version = matches.get_one::<u64>(PARAMETER_VERSION).copied();
    if identifiers > 1 && version.is_some() {
        error_utils::report_warning(&"--version is ignored when several identifiers are given");
        return None;
    }
    version
}

/// `from`/`until` followed by `page`/`size`, as every listing accepts them.
pub fn range_and_pagination_query(matches: &ArgMatches) -> QueryParams {
    range_query(matches, PARAMETER_FROM, PARAMETER_UNTIL)
        .with(PARAMETER_PAGE, matches.get_one::<u32>(PARAMETER_PAGE))
        .with(PARAMETER_SIZE, matches.get_one::<u32>(PARAMETER_SIZE))
}

pub fn range_query(matches: &ArgMatches, from: &str, until: &str) -> QueryParams {
    QueryParams::new()
        .with("from", matches.get_one::<String>(from))
        .with("until", matches.get_one::<String>(until))
}

pub fn identifiers(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    fn parsed(input: &str) -> String {
        format_query_date(&parse_date(input, now()).unwrap())
    }

    #[test]
    fn test_absolute_dates() {
        assert_eq!(parsed("2024-01-02"), "2024-01-02T00:00:00Z");
        assert_eq!(parsed("2024-01-02T03:04:05Z"), "2024-01-02T03:04:05Z");
        assert_eq!(parsed("2024-01-02T05:04:05+02:00"), "2024-01-02T03:04:05Z");
        assert_eq!(parsed("2024-01-02T03:04:05"), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_named_dates() {
        assert_eq!(parsed("now"), "2024-03-10T15:30:00Z");
        assert_eq!(parsed("Today"), "2024-03-10T00:00:00Z");
        assert_eq!(parsed("yesterday"), "2024-03-09T00:00:00Z");
    }

    #[test]
    fn test_relative_dates() {
        assert_eq!(parsed("2 days ago"), "2024-03-08T15:30:00Z");
        assert_eq!(parsed("two days ago"), "2024-03-08T15:30:00Z");
        assert_eq!(parsed("an hour ago"), "2024-03-10T14:30:00Z");
        assert_eq!(parsed("1 week ago"), "2024-03-03T15:30:00Z");
        assert_eq!(parsed("45 minutes ago"), "2024-03-10T14:45:00Z");
        assert_eq!(parsed("1h 30min ago"), "2024-03-10T14:00:00Z");
    }

    #[test]
    fn test_unparsable_dates() {
        assert!(parse_date("someday", now()).is_err());
        assert!(parse_date("3 fortnights ago", now()).is_err());
        assert!(parse_date("many days ago", now()).is_err());
        assert!(parse_date("ago", now()).is_err());
        assert!(parse_date("3 days", now()).is_err());
    }
}
