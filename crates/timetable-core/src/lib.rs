//! Core model and pure scheduling algorithms for timetable ingestion.
//!
//! Everything in this crate is plain value computation: the canonical session
//! model, range folding of discrete week/period sets, and conflict detection.

pub mod config;
pub mod conflict;
pub mod constants;
pub mod error;
pub mod model;
pub mod range;
