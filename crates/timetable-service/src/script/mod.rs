//! Sandboxed execution of untrusted timetable scraping scripts.

pub mod boa;
pub mod error;
pub mod host;
pub mod runtime;

pub use boa::{BoaFactory, BoaRuntime};
pub use error::{ScriptExecutionError, ScriptResult};
pub use host::{ExecuteOptions, ScriptHost};
pub use runtime::{EntryPoints, RuntimeFactory, ScriptContract, ScriptRuntime, Settlement};

/// Browser-ish globals installed before every script.
pub const PRELUDE: &str = include_str!("prelude.js");

/// The bundled regex-based scraper used when no caller script is supplied.
pub const DEFAULT_SCRAPER: &str = include_str!("default_scraper.js");
