//! Command-line front end for timetable ingestion.

pub mod cli;
pub mod error;
pub mod sections;
pub mod sink;
