//! Occurrence expansion for the WEEKLY recurrence subset.
//!
//! Only `FREQ=WEEKLY` is expanded. Any other frequency degrades to the
//! event's own `DTSTART` plus its `RDATE`s.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use timetable_core::config::IcsConfig;

use crate::rfc::ical::core::{IcsEvent, RecurrenceRule};

/// Bounds that guarantee expansion terminates on unbounded or hostile rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Occurrence cap when the rule has no `COUNT`.
    pub default_count: u32,
    /// Maximum number of weekly steps examined.
    pub max_weeks: u32,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self::from(&IcsConfig::default())
    }
}

impl From<&IcsConfig> for ExpansionLimits {
    fn from(config: &IcsConfig) -> Self {
        Self {
            default_count: config.default_count,
            max_weeks: config.max_weeks,
        }
    }
}

/// ## Summary
/// Expands an event into its concrete occurrence date-times.
///
/// The result is deduplicated and sorted chronologically. `EXDATE` values
/// remove exactly matching occurrences; date-only `EXDATE`s remove every
/// occurrence on that day.
#[must_use]
pub fn expand_occurrences(event: &IcsEvent, limits: ExpansionLimits) -> Vec<NaiveDateTime> {
    let mut occurrences: Vec<NaiveDateTime> = event.recurrence_dates.clone();

    match &event.recurrence_rule {
        Some(rule) if rule.is_weekly() => {
            occurrences.extend(expand_weekly(event.start, rule, limits));
        }
        Some(rule) => {
            tracing::debug!(freq = ?rule.freq, "Non-weekly RRULE treated as a single occurrence");
            occurrences.push(event.start);
        }
        None => occurrences.push(event.start),
    }

    occurrences.retain(|occurrence| {
        !event.exception_dates.contains(occurrence)
            && !event.exception_days.contains(&occurrence.date())
    });
    occurrences.sort_unstable();
    occurrences.dedup();

    tracing::trace!(
        summary = %event.summary,
        count = occurrences.len(),
        "Expanded occurrences"
    );
    occurrences
}

/// Generates the occurrences of a WEEKLY rule anchored at `start`.
///
/// Week `n` of weekday `d` lands on `next_or_same(start, d) + n * INTERVAL`
/// weeks, keeping the clock time of `start`.
fn expand_weekly(
    start: NaiveDateTime,
    rule: &RecurrenceRule,
    limits: ExpansionLimits,
) -> Vec<NaiveDateTime> {
    let interval = i64::from(rule.effective_interval());
    let count = rule.count.unwrap_or(limits.default_count) as usize;

    let mut weekdays = if rule.by_day.is_empty() {
        vec![start.weekday()]
    } else {
        rule.by_day.clone()
    };
    weekdays.sort_by_key(|day| day.num_days_from_monday());
    weekdays.dedup();

    let anchors: Vec<NaiveDateTime> = {
        let mut anchors: Vec<NaiveDateTime> = weekdays
            .iter()
            .filter_map(|day| next_or_same(start.date(), *day))
            .map(|date| date.and_time(start.time()))
            .collect();
        anchors.sort_unstable();
        anchors
    };

    let mut generated = Vec::new();
    'weeks: for week in 0..i64::from(limits.max_weeks) {
        if generated.len() >= count {
            break;
        }
        // Out-of-range date arithmetic ends expansion like an exceeded UNTIL
        let Some(shift) = TimeDelta::try_weeks(week * interval) else {
            break;
        };
        let mut any_in_bounds = false;

        for anchor in &anchors {
            let Some(candidate) = anchor.checked_add_signed(shift) else {
                break 'weeks;
            };
            if rule.until.is_some_and(|until| candidate.date() > until) {
                continue;
            }
            any_in_bounds = true;
            generated.push(candidate);
            if generated.len() >= count {
                break 'weeks;
            }
        }

        if !any_in_bounds {
            break;
        }
    }

    generated
}

/// First date on or after `date` that falls on `weekday`.
fn next_or_same(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
}
