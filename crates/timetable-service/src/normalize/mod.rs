//! Multi-format normalizer for the third-party timetable exchange JSON.
//!
//! Three shapes are accepted: a bare array of course objects, `{courses: [..]}`
//! and `{courseInfos: [..]}`. Parsing never fails; anything unrecognized
//! degrades to an empty result.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use timetable_core::constants::STOP_SENTINEL;
use timetable_core::model::{CanonicalSession, ThirdPartyCourse, ThirdPartyResult};
use timetable_core::range::{split_periods, split_weeks};

/// ## Summary
/// Parses the exchange format into discrete third-party courses.
///
/// Courses with a non-positive (or out of range) day, or whose resolved week
/// or period set is empty, are dropped individually.
#[tracing::instrument(skip(raw), fields(input_len = raw.len()))]
#[must_use]
pub fn parse_third_party_result(raw: &str) -> ThirdPartyResult {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == STOP_SENTINEL {
        tracing::debug!("Nothing to normalize");
        return ThirdPartyResult::default();
    }

    let root: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "Input is not exchange JSON");
            return ThirdPartyResult::default();
        }
    };

    let (entries, auxiliary) = match &root {
        Value::Array(entries) if trimmed.starts_with('[') => (entries.as_slice(), None),
        Value::Object(object) => (course_array(object), auxiliary_payload(object)),
        _ => {
            tracing::debug!("Exchange JSON root is neither an array nor an object");
            return ThirdPartyResult::default();
        }
    };

    let courses: Vec<ThirdPartyCourse> = entries.iter().filter_map(parse_course).collect();
    tracing::debug!(
        received = entries.len(),
        kept = courses.len(),
        has_auxiliary = auxiliary.is_some(),
        "Normalized exchange JSON"
    );

    ThirdPartyResult { courses, auxiliary }
}

/// ## Summary
/// Folds discrete courses into canonical sessions.
///
/// Each course yields one session per (week range, period range) pair, since a
/// session can only carry one contiguous range of each.
#[must_use]
pub fn convert_to_canonical(courses: &[ThirdPartyCourse]) -> Vec<CanonicalSession> {
    courses
        .iter()
        .flat_map(|course| {
            let periods = split_periods(course.periods.iter().copied());
            split_weeks(course.weeks.iter().copied())
                .into_iter()
                .flat_map(move |weeks| {
                    periods.clone().into_iter().map(move |period| {
                        CanonicalSession::from_ranges(
                            course.name.clone(),
                            course.teacher.clone(),
                            course.position.clone(),
                            course.day,
                            weeks,
                            period,
                        )
                    })
                })
        })
        .collect()
}

fn course_array(object: &Map<String, Value>) -> &[Value] {
    ["courses", "courseInfos"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map_or(&[][..], Vec::as_slice)
}

/// `timetable` is kept when it is an object or a non-blank string.
fn auxiliary_payload(object: &Map<String, Value>) -> Option<Value> {
    match object.get("timetable")? {
        value @ Value::Object(_) => Some(value.clone()),
        Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.clone())),
        _ => None,
    }
}

fn parse_course(entry: &Value) -> Option<ThirdPartyCourse> {
    let object = entry.as_object()?;

    let day = object
        .get("day")
        .and_then(lenient_int)
        .or_else(|| object.get("dayOfWeek").and_then(lenient_int))
        .unwrap_or(0);
    let Some(day) = u8::try_from(day).ok().filter(|d| (1..=7).contains(d)) else {
        tracing::trace!(day, "Dropping course with invalid day");
        return None;
    };

    let weeks: BTreeSet<u32> = int_set(object.get("weeks"), lenient_int);
    let periods: BTreeSet<u32> = int_set(object.get("sections"), section_number);
    if weeks.is_empty() || periods.is_empty() {
        tracing::trace!(
            name = text_field(object, "name"),
            "Dropping course without weeks or sections"
        );
        return None;
    }

    Some(ThirdPartyCourse {
        name: text_field(object, "name"),
        teacher: text_field(object, "teacher"),
        position: text_field(object, "position"),
        day,
        weeks,
        periods,
    })
}

/// Collects the positive integers of a JSON array; anything else is skipped.
fn int_set(value: Option<&Value>, read: fn(&Value) -> Option<i64>) -> BTreeSet<u32> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(read)
                .filter_map(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .collect()
        })
        .unwrap_or_default()
}

/// A section is either a bare number or `{ "section": n }`.
fn section_number(value: &Value) -> Option<i64> {
    match value {
        Value::Object(object) => object.get("section").and_then(lenient_int),
        other => lenient_int(other),
    }
}

/// Integers may arrive as numbers or numeric strings.
fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
