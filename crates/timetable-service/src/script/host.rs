//! Script Execution Host: drives the entry-point protocol of one script.

use std::ops::{Deref, DerefMut};

use serde_json::Value;
use timetable_core::config::ScriptConfig;
use timetable_core::constants::STOP_SENTINEL;

use super::PRELUDE;
use super::boa::BoaFactory;
use super::error::{ScriptExecutionError, ScriptResult};
use super::runtime::{RuntimeFactory, ScriptContract, ScriptRuntime};

/// Extra arguments handed to `scheduleHtmlProvider`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub auth_token: String,
    pub extra: String,
}

/// Runs untrusted scripts, one fresh runtime per call.
#[derive(Debug, Clone)]
pub struct ScriptHost<F> {
    factory: F,
    config: ScriptConfig,
}

impl Default for ScriptHost<BoaFactory> {
    fn default() -> Self {
        Self::new(BoaFactory, ScriptConfig::default())
    }
}

impl<F: RuntimeFactory> ScriptHost<F> {
    #[must_use]
    pub const fn new(factory: F, config: ScriptConfig) -> Self {
        Self { factory, config }
    }

    /// ## Summary
    /// Runs `script` against `raw_input` and returns its string payload.
    ///
    /// ## Errors
    /// See [`ScriptHost::execute_with`].
    pub fn execute(&self, script: &str, raw_input: &str) -> ScriptResult<String> {
        self.execute_with(script, raw_input, &ExecuteOptions::default())
    }

    /// ## Summary
    /// Runs `script` against `raw_input` using the first entry point it
    /// defines, in the order provider, parser, legacy `parse`.
    ///
    /// A deferred result is polled for at most `poll_budget` microtask drains;
    /// if it never settles the partial value (usually empty) is returned.
    ///
    /// ## Errors
    /// - `NoEntryPoint` if the script defines none of the entry points.
    /// - `Script` if the script throws or a deferred value rejects.
    /// - `Runtime` if the sandbox cannot be created.
    #[tracing::instrument(skip_all, fields(script_len = script.len(), input_len = raw_input.len()))]
    pub fn execute_with(
        &self,
        script: &str,
        raw_input: &str,
        options: &ExecuteOptions,
    ) -> ScriptResult<String> {
        let mut runtime = Lease(self.factory.create(&self.config)?);
        runtime.load(PRELUDE, script)?;

        let entry_points = runtime.probe();
        let Some(contract) = ScriptContract::detect(entry_points) else {
            tracing::warn!(?entry_points, "Script defines no compatible entry function");
            return Err(ScriptExecutionError::NoEntryPoint);
        };
        tracing::debug!(?contract, "Detected script contract");

        let html = runtime.string(raw_input);
        let budget = self.config.poll_budget;

        match contract {
            ScriptContract::Provider { parser, timer } => {
                run_provider(&mut *runtime, html, options, parser, timer, budget)
            }
            ScriptContract::ParserOnly => {
                let result = runtime.call(ScriptContract::PARSER_FN, &[html])?;
                let result = settle(&mut *runtime, result, budget)?;
                runtime.stringify(&result)
            }
            ScriptContract::LegacyParse => {
                let result = runtime.call(ScriptContract::LEGACY_FN, &[html])?;
                let result = settle(&mut *runtime, result, budget)?;
                runtime.stringify(&result)
            }
        }
    }
}

/// Provider, then optional parser, then optional timer.
fn run_provider<R: ScriptRuntime>(
    runtime: &mut R,
    html: R::Value,
    options: &ExecuteOptions,
    has_parser: bool,
    has_timer: bool,
    budget: u32,
) -> ScriptResult<String> {
    let token = runtime.string(&options.auth_token);
    let extra = runtime.string(&options.extra);
    let provided = runtime.call(ScriptContract::PROVIDER_FN, &[html, token, extra])?;
    let provided = settle(runtime, provided, budget)?;
    let provider_text = runtime.stringify(&provided)?;

    if provider_text.trim() == STOP_SENTINEL {
        tracing::debug!("Provider asked to stop");
        return Ok(provider_text);
    }

    let provider_arg = runtime.string(&provider_text);
    let parsed = if has_parser {
        let parsed = runtime.call(ScriptContract::PARSER_FN, &[provider_arg.clone()])?;
        Some(settle(runtime, parsed, budget)?)
    } else {
        None
    };

    let timer_text = if has_timer {
        let parser_res = match &parsed {
            Some(value) => value.clone(),
            None => runtime.undefined(),
        };
        let context = runtime.object(&[("providerRes", provider_arg), ("parserRes", parser_res)])?;
        let timed = runtime.call(ScriptContract::TIMER_FN, &[context])?;
        let timed = settle(runtime, timed, budget)?;
        Some(runtime.stringify(&timed)?)
    } else {
        None
    };

    let primary = match &parsed {
        Some(value) => runtime.stringify(value)?,
        None => provider_text,
    };
    Ok(compose_timetable(primary, timer_text))
}

/// Polls a deferred value until it settles or the budget runs out.
fn settle<R: ScriptRuntime>(runtime: &mut R, value: R::Value, budget: u32) -> ScriptResult<R::Value> {
    if !runtime.is_deferred(&value) {
        return Ok(value);
    }

    let watch = runtime.watch(&value)?;
    let mut state = runtime.settlement(&watch)?;
    let mut polls = 0;
    while !state.resolved && polls < budget {
        polls += 1;
        let drained = runtime.drain_microtasks();
        state = runtime.settlement(&watch)?;
        if !drained {
            break;
        }
    }

    if let Some(error) = state.error {
        return Err(ScriptExecutionError::Script(error));
    }
    if !state.resolved {
        tracing::warn!(polls, "Deferred result did not settle; using partial value");
    }
    Ok(match state.value {
        Some(value) => value,
        None => runtime.undefined(),
    })
}

/// Injects the timer result as `timetable` into a JSON object payload that
/// lacks one. Any other payload is returned unchanged.
fn compose_timetable(primary: String, timer: Option<String>) -> String {
    let Some(timer) = timer.filter(|t| !t.trim().is_empty()) else {
        return primary;
    };
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(&primary) else {
        return primary;
    };
    if object.contains_key("timetable") {
        return primary;
    }

    let timetable = match serde_json::from_str::<Value>(&timer) {
        Ok(value) => value,
        Err(_) => Value::String(timer),
    };
    object.insert("timetable".to_string(), timetable);
    Value::Object(object).to_string()
}

/// Owns a runtime for the duration of one call.
struct Lease<R>(R);

impl<R> Deref for Lease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.0
    }
}

impl<R> DerefMut for Lease<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.0
    }
}

impl<R> Drop for Lease<R> {
    fn drop(&mut self) {
        tracing::trace!("Releasing script runtime");
    }
}
