//! The VEVENT subset used by timetable import.

use chrono::{NaiveDate, NaiveDateTime};

use super::rrule::RecurrenceRule;

/// One `VEVENT`, with every date-time already converted to local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub recurrence_dates: Vec<NaiveDateTime>,
    pub exception_dates: Vec<NaiveDateTime>,
    /// `EXDATE` entries written as bare dates; these remove every occurrence on that day.
    pub exception_days: Vec<NaiveDate>,
}

impl IcsEvent {
    /// Creates an event with only a start time.
    #[must_use]
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            summary: String::new(),
            location: String::new(),
            description: String::new(),
            start,
            end: None,
            recurrence_rule: None,
            recurrence_dates: Vec::new(),
            exception_dates: Vec::new(),
            exception_days: Vec::new(),
        }
    }

    /// Event length in whole minutes; zero when `DTEND` is absent or precedes `DTSTART`.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        self.end
            .map_or(0, |end| end.signed_duration_since(self.start).num_minutes().max(0))
    }
}
