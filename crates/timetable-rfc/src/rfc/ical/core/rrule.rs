//! Recurrence rule subset (RFC 5545 §3.3.10).

use chrono::{NaiveDate, Weekday};

/// Recurrence frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Weekly,
    /// Any other `FREQ`; recurrence is not expanded for these.
    Other(String),
}

impl Frequency {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("WEEKLY") {
            Self::Weekly
        } else {
            Self::Other(s.to_ascii_uppercase())
        }
    }
}

/// The recognized parts of an `RRULE` value.
///
/// Unrecognized keys (`BYMONTH`, `WKST`, ...) are dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: Option<u32>,
    pub count: Option<u32>,
    /// Inclusive last date.
    pub until: Option<NaiveDate>,
    pub by_day: Vec<Weekday>,
}

impl RecurrenceRule {
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: None,
            count: None,
            until: None,
            by_day: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_weekly(&self) -> bool {
        self.freq == Frequency::Weekly
    }

    /// `INTERVAL`, defaulting to 1 and floored at 1.
    #[must_use]
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1).max(1)
    }
}
