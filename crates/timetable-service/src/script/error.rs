use thiserror::Error;

/// Failures of one sandboxed script invocation.
///
/// Polling exhaustion is deliberately absent: an unsettled deferred value
/// yields whatever partial state exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptExecutionError {
    #[error("no compatible entry function")]
    NoEntryPoint,

    /// The script threw or its deferred value rejected.
    #[error("Script error: {0}")]
    Script(String),

    /// The sandbox could not be set up.
    #[error("Script runtime error: {0}")]
    Runtime(String),
}

pub type ScriptResult<T> = std::result::Result<T, ScriptExecutionError>;
