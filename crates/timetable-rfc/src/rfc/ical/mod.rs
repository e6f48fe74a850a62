//! iCalendar parsing and recurrence expansion.

pub mod core;
pub mod expand;
pub mod parse;
