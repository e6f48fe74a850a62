//! The canonical session value type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::course::CanonicalCourse;
use super::range::{PeriodRange, WeekParity, WeekRange};
use crate::error::{CoreError, CoreResult};

/// One contiguous-week, contiguous-period, single-weekday occurrence of a course.
///
/// Produced fresh per ingestion run. `id` is only set when the session
/// mirrors a record that already exists in storage; it is what in-place edits
/// use to avoid reporting a conflict with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub teacher: String,
    pub location: String,
    /// 1 = Monday .. 7 = Sunday
    pub day_of_week: u8,
    pub start_period: u32,
    pub duration: u32,
    pub start_week: u32,
    pub end_week: u32,
    pub week_parity: WeekParity,
}

impl CanonicalSession {
    /// ## Summary
    /// Builds a session from a folded week range and period range.
    #[must_use]
    pub fn from_ranges(
        name: impl Into<String>,
        teacher: impl Into<String>,
        location: impl Into<String>,
        day_of_week: u8,
        weeks: WeekRange,
        periods: PeriodRange,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            teacher: teacher.into(),
            location: location.into(),
            day_of_week,
            start_period: periods.start_period,
            duration: periods.duration,
            start_week: weeks.start_week,
            end_week: weeks.end_week,
            week_parity: weeks.parity,
        }
    }

    #[must_use]
    pub const fn week_range(&self) -> WeekRange {
        WeekRange::new(self.start_week, self.end_week, self.week_parity)
    }

    #[must_use]
    pub const fn period_range(&self) -> PeriodRange {
        PeriodRange::new(self.start_period, self.duration)
    }

    /// Last period occupied (inclusive).
    #[must_use]
    pub const fn end_period(&self) -> u32 {
        self.period_range().end_period()
    }

    /// ## Summary
    /// Checks the structural invariants every produced session must satisfy.
    ///
    /// ## Errors
    /// Returns `CoreError::InvariantViolation` naming the first violated bound.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=7).contains(&self.day_of_week) {
            return Err(CoreError::InvariantViolation("day_of_week outside 1..=7"));
        }
        if self.start_period == 0 {
            return Err(CoreError::InvariantViolation("start_period must be >= 1"));
        }
        if self.duration == 0 {
            return Err(CoreError::InvariantViolation("duration must be >= 1"));
        }
        if self.start_week == 0 {
            return Err(CoreError::InvariantViolation("start_week must be >= 1"));
        }
        if self.end_week < self.start_week {
            return Err(CoreError::InvariantViolation("end_week precedes start_week"));
        }
        if !self.week_parity.admits(self.start_week) {
            return Err(CoreError::InvariantViolation(
                "start_week does not match week_parity",
            ));
        }
        Ok(())
    }

    /// ## Summary
    /// Converts into the persisted entity for the given semester.
    #[must_use]
    pub fn into_course(self, semester_id: impl Into<String>, color: impl Into<String>) -> CanonicalCourse {
        CanonicalCourse {
            session: self,
            semester_id: semester_id.into(),
            color: color.into(),
        }
    }
}

impl fmt::Display for CanonicalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (day {}, {}, {})",
            self.name,
            self.day_of_week,
            self.period_range(),
            self.week_range()
        )
    }
}
