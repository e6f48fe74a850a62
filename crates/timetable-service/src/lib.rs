//! Timetable ingestion: the exchange-format normalizer, ICS session folding,
//! the sandboxed script host and the orchestrator tying them together.

pub mod error;
pub mod ics;
pub mod ingest;
pub mod normalize;
pub mod script;
