//! Date and date-time values.

use std::fmt;

use chrono::{FixedOffset, NaiveDateTime, TimeDelta};

/// How a date-time value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// `yyyyMMdd`, read as local midnight.
    Date,
    /// `yyyyMMdd'T'HHmmss'Z'`.
    Utc,
    /// `yyyyMMdd'T'HHmmss` without a zone designator.
    Floating,
}

/// A parsed DATE or DATE-TIME value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IcsDateTime {
    pub value: NaiveDateTime,
    pub form: DateTimeForm,
}

impl IcsDateTime {
    #[must_use]
    pub const fn new(value: NaiveDateTime, form: DateTimeForm) -> Self {
        Self { value, form }
    }

    #[must_use]
    pub const fn is_date_only(&self) -> bool {
        matches!(self.form, DateTimeForm::Date)
    }

    /// ## Summary
    /// Wall-clock time of this value in the importing user's zone.
    ///
    /// Only UTC values are shifted; dates and floating times already are
    /// wall-clock values.
    #[must_use]
    pub fn to_local(&self, offset: FixedOffset) -> NaiveDateTime {
        match self.form {
            DateTimeForm::Utc => {
                self.value + TimeDelta::seconds(i64::from(offset.local_minus_utc()))
            }
            DateTimeForm::Date | DateTimeForm::Floating => self.value,
        }
    }
}

impl fmt::Display for IcsDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            DateTimeForm::Date => write!(f, "{}", self.value.format("%Y%m%d")),
            DateTimeForm::Utc => write!(f, "{}", self.value.format("%Y%m%dT%H%M%SZ")),
            DateTimeForm::Floating => write!(f, "{}", self.value.format("%Y%m%dT%H%M%S")),
        }
    }
}
