//! iCalendar (RFC 5545) text layer for timetable ingestion.
//!
//! Covers the subset needed to recover weekly class meetings from a calendar
//! export: line unfolding, content-line lexing, lenient `VEVENT` extraction and
//! WEEKLY recurrence expansion.

pub mod rfc;
