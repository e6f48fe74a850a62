//! iCalendar core models (RFC 5545).
//!
//! Only what the timetable path needs survives lexing: the raw content line,
//! its date-time values, the weekly recurrence rule and the event built from
//! them.

mod datetime;
mod event;
mod property;
mod rrule;

pub use datetime::{DateTimeForm, IcsDateTime};
pub use event::IcsEvent;
pub use property::{ContentLine, Parameter};
pub use rrule::{Frequency, RecurrenceRule};
