/// Microtask-drain iterations allowed while waiting on one deferred script value.
pub const SCRIPT_POLL_BUDGET: u32 = 200;

/// Interpreter loop-iteration budget applied to each sandbox instance.
pub const SCRIPT_LOOP_ITERATION_LIMIT: u64 = 10_000_000;

/// Interpreter recursion budget applied to each sandbox instance.
pub const SCRIPT_RECURSION_LIMIT: usize = 512;

/// Occurrence cap for a WEEKLY rule that carries no `COUNT`.
pub const ICS_DEFAULT_COUNT: u32 = 60;

/// Hard cap on weekly steps taken while expanding a single rule.
pub const ICS_MAX_WEEKS: u32 = 200;

/// Minutes after midnight at which period 1 begins (08:00).
pub const ICS_FIRST_PERIOD_MINUTES: u32 = 480;

/// Length of one period slot in minutes.
pub const ICS_PERIOD_MINUTES: u32 = 60;

/// Literal a script returns to stop the import flow without producing courses.
pub const STOP_SENTINEL: &str = "do not continue";
