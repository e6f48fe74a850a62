//! The sandbox seam between the script host and an embedded interpreter.

use timetable_core::config::ScriptConfig;

use super::error::ScriptResult;

/// Which entry-point functions a loaded script defines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryPoints {
    pub provider: bool,
    pub parser: bool,
    pub timer: bool,
    pub legacy_parse: bool,
}

/// The supported script contracts, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptContract {
    /// `scheduleHtmlProvider`, optionally followed by `scheduleHtmlParser` and
    /// `scheduleTimer`.
    Provider { parser: bool, timer: bool },
    /// `scheduleHtmlParser` alone.
    ParserOnly,
    /// Legacy `parse`.
    LegacyParse,
}

impl ScriptContract {
    pub const PROVIDER_FN: &'static str = "scheduleHtmlProvider";
    pub const PARSER_FN: &'static str = "scheduleHtmlParser";
    pub const TIMER_FN: &'static str = "scheduleTimer";
    pub const LEGACY_FN: &'static str = "parse";

    /// Picks the highest-priority contract the script satisfies.
    #[must_use]
    pub const fn detect(entry_points: EntryPoints) -> Option<Self> {
        if entry_points.provider {
            Some(Self::Provider {
                parser: entry_points.parser,
                timer: entry_points.timer,
            })
        } else if entry_points.parser {
            Some(Self::ParserOnly)
        } else if entry_points.legacy_parse {
            Some(Self::LegacyParse)
        } else {
            None
        }
    }
}

/// Snapshot of a watched deferred value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement<V> {
    pub resolved: bool,
    pub value: Option<V>,
    pub error: Option<String>,
}

impl<V> Default for Settlement<V> {
    fn default() -> Self {
        Self {
            resolved: false,
            value: None,
            error: None,
        }
    }
}

/// One isolated interpreter instance.
///
/// Dropping the instance releases every native resource it holds; the host
/// relies on this to release the sandbox on every exit path.
pub trait ScriptRuntime {
    /// An interpreter value.
    type Value: Clone;
    /// Handle to the settlement state of one deferred value.
    type Watch;

    /// ## Summary
    /// Evaluates the environment prelude and then the untrusted script.
    ///
    /// ## Errors
    /// `Runtime` if the prelude fails, `Script` if the script throws while
    /// loading.
    fn load(&mut self, prelude: &str, script: &str) -> ScriptResult<()>;

    /// Reports which entry-point functions the loaded script defines.
    fn probe(&mut self) -> EntryPoints;

    /// ## Summary
    /// Calls a global function.
    ///
    /// ## Errors
    /// `Script` if the function is missing or throws.
    fn call(&mut self, function: &str, args: &[Self::Value]) -> ScriptResult<Self::Value>;

    fn string(&mut self, text: &str) -> Self::Value;

    fn undefined(&mut self) -> Self::Value;

    /// ## Summary
    /// Builds a plain object from named fields.
    ///
    /// ## Errors
    /// `Runtime` if a property cannot be defined.
    fn object(&mut self, fields: &[(&str, Self::Value)]) -> ScriptResult<Self::Value>;

    /// Whether `value` is a promise-like deferred value.
    fn is_deferred(&mut self, value: &Self::Value) -> bool;

    /// ## Summary
    /// Attaches resolution and rejection handlers to a deferred value.
    ///
    /// ## Errors
    /// `Runtime` if the handlers cannot be attached.
    fn watch(&mut self, value: &Self::Value) -> ScriptResult<Self::Watch>;

    /// ## Summary
    /// Reads the current state of a watched value.
    ///
    /// ## Errors
    /// `Runtime` if the state cannot be read.
    fn settlement(&mut self, watch: &Self::Watch) -> ScriptResult<Settlement<Self::Value>>;

    /// Runs pending microtasks. Returns `false` when the interpreter has no
    /// microtask queue to drain.
    fn drain_microtasks(&mut self) -> bool;

    /// ## Summary
    /// Converts a result value to its string payload: strings pass through,
    /// `null`/`undefined` become empty, anything else is JSON-stringified.
    ///
    /// ## Errors
    /// `Script` if serialization throws (for example on a cyclic value).
    fn stringify(&mut self, value: &Self::Value) -> ScriptResult<String>;
}

/// Creates a fresh, isolated runtime per invocation.
pub trait RuntimeFactory {
    type Runtime: ScriptRuntime;

    /// ## Summary
    /// Creates a runtime with the configured interpreter budgets applied.
    ///
    /// ## Errors
    /// `Runtime` if the interpreter cannot be initialized.
    fn create(&self, config: &ScriptConfig) -> ScriptResult<Self::Runtime>;
}
