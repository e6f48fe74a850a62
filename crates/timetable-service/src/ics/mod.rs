//! Folds expanded ICS occurrences into canonical sessions.
//!
//! Week numbers are counted from the Monday of the earliest occurrence across
//! the whole document, so every event shares one semester baseline.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use regex::Regex;
use timetable_core::config::IcsConfig;
use timetable_core::model::{CanonicalSession, PeriodRange};
use timetable_core::range::split_weeks;
use timetable_rfc::rfc::ical::core::IcsEvent;
use timetable_rfc::rfc::ical::expand::{ExpansionLimits, expand_occurrences};
use timetable_rfc::rfc::ical::parse::parse_events_with_offset;

static TEACHER_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:任课教师|授课教师|主讲教师|teachers?|instructors?|lecturers?|professors?|教师|老师)\s*[:：]?\s*(.+?)\s*$",
    )
    .ok()
});

/// Wall-clock span of one numbered section, in minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTime {
    pub section: u32,
    pub start_minutes: u32,
    pub end_minutes: u32,
}

/// How event clock times become period numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodMapping {
    /// Period 1 starts at `first_period_minutes`; each period lasts `period_minutes`.
    Fixed {
        first_period_minutes: u32,
        period_minutes: u32,
    },
    /// A configured section table, sorted by start time.
    Sections(Vec<SectionTime>),
}

impl PeriodMapping {
    /// ## Summary
    /// Maps an event's start time and length onto a period range.
    ///
    /// Both start period and duration are floored at 1.
    #[must_use]
    pub fn period_range(&self, start: NaiveDateTime, duration_minutes: i64) -> PeriodRange {
        let start_minutes = start.hour() * 60 + start.minute();
        let duration_minutes = u32::try_from(duration_minutes.max(0)).unwrap_or(u32::MAX);

        match self {
            Self::Fixed {
                first_period_minutes,
                period_minutes,
            } => {
                let period_minutes = (*period_minutes).max(1);
                let start_period = start_minutes.saturating_sub(*first_period_minutes) / period_minutes + 1;
                let duration = duration_minutes.div_ceil(period_minutes).max(1);
                PeriodRange::new(start_period, duration)
            }
            Self::Sections(sections) => {
                let end_minutes = start_minutes.saturating_add(duration_minutes);
                let first = sections
                    .iter()
                    .rev()
                    .find(|s| s.start_minutes <= start_minutes)
                    .or_else(|| sections.first());
                let Some(first) = first else {
                    return PeriodRange::new(1, 1);
                };
                let last = sections
                    .iter()
                    .rev()
                    .find(|s| s.start_minutes < end_minutes)
                    .filter(|s| s.section >= first.section)
                    .unwrap_or(first);
                PeriodRange::new(first.section.max(1), last.section - first.section + 1)
            }
        }
    }
}

/// Turns an ICS document into canonical sessions.
#[derive(Debug, Clone)]
pub struct IcsImporter {
    limits: ExpansionLimits,
    mapping: PeriodMapping,
    utc_offset: FixedOffset,
    /// Length assumed for events without `DTEND`.
    default_minutes: Option<u32>,
}

impl Default for IcsImporter {
    fn default() -> Self {
        Self::new(&IcsConfig::default())
    }
}

impl IcsImporter {
    #[must_use]
    pub fn new(config: &IcsConfig) -> Self {
        let utc_offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    minutes = config.utc_offset_minutes,
                    "UTC offset out of range; using UTC"
                );
                Utc.fix()
            });

        Self {
            limits: ExpansionLimits::from(config),
            mapping: PeriodMapping::Fixed {
                first_period_minutes: config.first_period_minutes,
                period_minutes: config.period_minutes,
            },
            utc_offset,
            default_minutes: None,
        }
    }

    /// Uses a section table instead of the fixed period mapping. An empty
    /// table keeps the fixed mapping.
    #[must_use]
    pub fn with_sections(mut self, mut sections: Vec<SectionTime>) -> Self {
        if !sections.is_empty() {
            sections.sort_by_key(|s| (s.start_minutes, s.section));
            self.mapping = PeriodMapping::Sections(sections);
        }
        self
    }

    /// Gives events without `DTEND` this length instead of a single period.
    #[must_use]
    pub fn with_default_minutes(mut self, minutes: u32) -> Self {
        self.default_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub const fn mapping(&self) -> &PeriodMapping {
        &self.mapping
    }

    /// ## Summary
    /// Expands every event and folds its occurrences into sessions, one per
    /// (weekday, week range) pair.
    ///
    /// Never fails: malformed events are dropped and an unusable document
    /// yields no sessions.
    #[tracing::instrument(skip(self, raw), fields(input_len = raw.len()))]
    #[must_use]
    pub fn expand(&self, raw: &str) -> Vec<CanonicalSession> {
        let expanded: Vec<(IcsEvent, Vec<NaiveDateTime>)> = parse_events_with_offset(raw, self.utc_offset)
            .into_iter()
            .map(|event| {
                let occurrences = expand_occurrences(&event, self.limits);
                (event, occurrences)
            })
            .filter(|(event, occurrences)| {
                if occurrences.is_empty() {
                    tracing::debug!(summary = %event.summary, "Event has no remaining occurrences");
                }
                !occurrences.is_empty()
            })
            .collect();

        let Some(baseline) = expanded
            .iter()
            .filter_map(|(_, occurrences)| occurrences.first())
            .min()
            .map(|earliest| monday_of(earliest.date()))
        else {
            tracing::debug!("No occurrences in document");
            return Vec::new();
        };

        let sessions: Vec<CanonicalSession> = expanded
            .iter()
            .flat_map(|(event, occurrences)| self.fold_event(event, occurrences, baseline))
            .collect();

        tracing::debug!(
            events = expanded.len(),
            sessions = sessions.len(),
            %baseline,
            "Folded ICS events"
        );
        sessions
    }

    fn fold_event(
        &self,
        event: &IcsEvent,
        occurrences: &[NaiveDateTime],
        baseline: NaiveDate,
    ) -> Vec<CanonicalSession> {
        let minutes = match (event.end, self.default_minutes) {
            (None, Some(default)) => i64::from(default),
            _ => event.duration_minutes(),
        };
        let periods = self.mapping.period_range(event.start, minutes);
        let teacher = extract_teacher(&event.description);
        let teacher = teacher.as_str();

        let mut weeks_by_day: BTreeMap<u8, Vec<u32>> = BTreeMap::new();
        for occurrence in occurrences {
            let Some(week) = week_number(baseline, occurrence.date()) else {
                continue;
            };
            // number_from_monday is 1..=7
            let day = u8::try_from(occurrence.weekday().number_from_monday()).unwrap_or(1);
            weeks_by_day.entry(day).or_default().push(week);
        }

        weeks_by_day
            .into_iter()
            .flat_map(|(day, weeks)| {
                split_weeks(weeks).into_iter().map(move |week_range| {
                    CanonicalSession::from_ranges(
                        event.summary.clone(),
                        teacher,
                        event.location.clone(),
                        day,
                        week_range,
                        periods,
                    )
                })
            })
            .collect()
    }
}

/// ## Summary
/// Expands an ICS document with the default configuration.
#[must_use]
pub fn expand(raw: &str) -> Vec<CanonicalSession> {
    IcsImporter::default().expand(raw)
}

/// ## Summary
/// Finds a teacher name in an event description.
///
/// Scans lines for a teacher/instructor marker and returns the rest of the
/// line with the marker stripped, or an empty string.
#[must_use]
pub fn extract_teacher(description: &str) -> String {
    let Some(pattern) = TEACHER_LINE.as_ref() else {
        return String::new();
    };
    description
        .lines()
        .find_map(|line| pattern.captures(line))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

/// 1-based week index of `date` relative to `baseline` (a Monday).
fn week_number(baseline: NaiveDate, date: NaiveDate) -> Option<u32> {
    let days = (date - baseline).num_days();
    u32::try_from(days / 7 + 1).ok().filter(|week| *week >= 1)
}
