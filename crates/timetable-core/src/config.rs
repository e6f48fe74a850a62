use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    ICS_DEFAULT_COUNT, ICS_FIRST_PERIOD_MINUTES, ICS_MAX_WEEKS, ICS_PERIOD_MINUTES,
    SCRIPT_LOOP_ITERATION_LIMIT, SCRIPT_POLL_BUDGET, SCRIPT_RECURSION_LIMIT,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default)]
    pub ics: IcsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Budgets applied to every sandboxed script invocation.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub poll_budget: u32,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            poll_budget: SCRIPT_POLL_BUDGET,
            loop_iteration_limit: SCRIPT_LOOP_ITERATION_LIMIT,
            recursion_limit: SCRIPT_RECURSION_LIMIT,
        }
    }
}

/// Recurrence expansion bounds and the clock-time to period mapping.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IcsConfig {
    pub default_count: u32,
    pub max_weeks: u32,
    pub first_period_minutes: u32,
    pub period_minutes: u32,
    /// Offset applied to `...Z` date-times to get local wall-clock times.
    pub utc_offset_minutes: i32,
}

impl Default for IcsConfig {
    fn default() -> Self {
        Self {
            default_count: ICS_DEFAULT_COUNT,
            max_weeks: ICS_MAX_WEEKS,
            first_period_minutes: ICS_FIRST_PERIOD_MINUTES,
            period_minutes: ICS_PERIOD_MINUTES,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(environment())
    }

    fn load_from(environment: config::Environment) -> Result<Self> {
        Ok(Config::builder()
            // Numeric sections fall back to their serde defaults
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// `TIMETABLE_<SECTION>__<KEY>`, e.g. `TIMETABLE_ICS__PERIOD_MINUTES`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("TIMETABLE")
        .prefix_separator("_")
        .separator("__")
        .convert_case(config::Case::Snake)
        .ignore_empty(true)
        .try_parsing(true)
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
