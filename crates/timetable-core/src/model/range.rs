//! Folded week and period ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which semester weeks a recurring block lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekParity {
    #[default]
    All,
    Odd,
    Even,
}

impl WeekParity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Odd => "odd",
            Self::Even => "even",
        }
    }

    /// Distance between consecutive weeks covered by this parity.
    #[must_use]
    pub const fn step(self) -> u32 {
        match self {
            Self::All => 1,
            Self::Odd | Self::Even => 2,
        }
    }

    /// Returns whether `week` is compatible with this parity.
    #[must_use]
    pub const fn admits(self, week: u32) -> bool {
        match self {
            Self::All => true,
            Self::Odd => week % 2 == 1,
            Self::Even => week % 2 == 0,
        }
    }

    /// ## Summary
    /// Parity of a closed range given the step it was built with and its first week.
    ///
    /// A step of 0 (single element) or 1 is `All`; a step of 2 takes the parity
    /// of `start`.
    #[must_use]
    pub const fn from_step(step: u32, start: u32) -> Self {
        if step == 2 {
            if start % 2 == 1 { Self::Odd } else { Self::Even }
        } else {
            Self::All
        }
    }
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of weeks `[start_week, end_week]` filtered by `parity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start_week: u32,
    pub end_week: u32,
    #[serde(rename = "weekParity")]
    pub parity: WeekParity,
}

impl WeekRange {
    #[must_use]
    pub const fn new(start_week: u32, end_week: u32, parity: WeekParity) -> Self {
        Self {
            start_week,
            end_week,
            parity,
        }
    }

    /// Returns whether this range actually covers `week`.
    #[must_use]
    pub const fn contains(&self, week: u32) -> bool {
        week >= self.start_week && week <= self.end_week && self.parity.admits(week)
    }

    /// Iterates the concrete weeks covered by this range.
    pub fn weeks(&self) -> impl Iterator<Item = u32> + use<> {
        let parity = self.parity;
        (self.start_week..=self.end_week).filter(move |w| parity.admits(*w))
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_week == self.end_week {
            write!(f, "week {}", self.start_week)
        } else {
            write!(f, "weeks {}-{}", self.start_week, self.end_week)?;
            if self.parity == WeekParity::All {
                Ok(())
            } else {
                write!(f, " ({})", self.parity)
            }
        }
    }
}

/// A contiguous run of class periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRange {
    pub start_period: u32,
    pub duration: u32,
}

impl PeriodRange {
    #[must_use]
    pub const fn new(start_period: u32, duration: u32) -> Self {
        Self {
            start_period,
            duration,
        }
    }

    /// Last period covered (inclusive).
    #[must_use]
    pub const fn end_period(&self) -> u32 {
        self.start_period + self.duration.saturating_sub(1)
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.duration <= 1 {
            write!(f, "period {}", self.start_period)
        } else {
            write!(f, "periods {}-{}", self.start_period, self.end_period())
        }
    }
}
