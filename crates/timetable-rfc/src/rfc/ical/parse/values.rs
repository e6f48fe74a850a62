//! Value parsers for the iCalendar properties timetable import reads.

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{DateTimeForm, Frequency, IcsDateTime, RecurrenceRule};

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Parses a DATE or DATE-TIME value.
///
/// Accepted forms:
/// - `yyyyMMdd` (local midnight)
/// - `yyyyMMdd'T'HHmmss'Z'` (UTC)
/// - `yyyyMMdd'T'HHmmss` (floating; only the first 15 characters are read)
///
/// ## Errors
/// Returns an error if the value matches none of the forms.
pub fn parse_date_time(s: &str, line: usize) -> ParseResult<IcsDateTime> {
    let s = s.trim();

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| {
            ParseError::new(ParseErrorKind::InvalidDate, line, 1).with_context(e.to_string())
        })?;
        return Ok(IcsDateTime::new(
            date.and_time(chrono::NaiveTime::MIN),
            DateTimeForm::Date,
        ));
    }

    let Some(head) = s.get(..15) else {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, 1)
            .with_context(format!("'{s}' is too short")));
    };
    let value = NaiveDateTime::parse_from_str(head, DATE_TIME_FORMAT).map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, 1).with_context(e.to_string())
    })?;

    let form = if s.ends_with(['Z', 'z']) {
        DateTimeForm::Utc
    } else {
        DateTimeForm::Floating
    };
    Ok(IcsDateTime::new(value, form))
}

/// Parses a comma-separated `RDATE`/`EXDATE` value list.
///
/// Malformed entries are skipped; the rest of the list is kept. `PERIOD`
/// entries (`start/end`) contribute their start.
#[must_use]
pub fn parse_date_time_list(raw: &str, line: usize) -> Vec<IcsDateTime> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let start = entry.split('/').next().unwrap_or(entry);
            match parse_date_time(start, line) {
                Ok(dt) => Some(dt),
                Err(err) => {
                    tracing::debug!(%err, entry, "Skipping malformed date list entry");
                    None
                }
            }
        })
        .collect()
}

/// Parses the recognized parts of an `RRULE` value.
///
/// `FREQ` is required. Malformed `INTERVAL`, `COUNT` and `UNTIL` parts are
/// ignored so their defaults apply; unknown `BYDAY` codes are dropped.
///
/// ## Errors
/// Returns an error if `FREQ` is missing.
pub fn parse_rrule(s: &str, line: usize) -> ParseResult<RecurrenceRule> {
    let mut freq = None;
    let mut rule = RecurrenceRule::new(Frequency::Weekly);

    for part in s.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => freq = Some(Frequency::parse(value)),
            "INTERVAL" => rule.interval = value.parse().ok(),
            "COUNT" => rule.count = value.parse().ok(),
            "UNTIL" => rule.until = parse_date_time(value, line).ok().map(|dt| dt.value.date()),
            "BYDAY" => rule.by_day = value.split(',').filter_map(parse_weekday).collect(),
            other => tracing::trace!(key = other, "Ignoring RRULE part"),
        }
    }

    rule.freq = freq.ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidRecur, line, 1).with_context("missing FREQ")
    })?;
    Ok(rule)
}

/// Parses a `BYDAY` entry, ignoring any ordinal prefix (`1MO`, `-1FR`).
fn parse_weekday(s: &str) -> Option<Weekday> {
    let s = s.trim();
    let code = s.get(s.len().checked_sub(2)?..)?;
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(next) => result.push(next),
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}
