//! `ScriptRuntime` backed by the Boa JavaScript engine.
//!
//! Each runtime is an isolated `Context` with loop and recursion budgets. The
//! only host capability exposed to scripts is `__hostLog`, which the prelude
//! wraps as `console` and which forwards to `tracing` under the `script`
//! target.

use boa_engine::{
    Context, JsError, JsObject, JsResult, JsString, JsValue, NativeFunction, Source, js_string,
};
use timetable_core::config::ScriptConfig;

use super::error::{ScriptExecutionError, ScriptResult};
use super::runtime::{EntryPoints, RuntimeFactory, ScriptContract, ScriptRuntime, Settlement};

const THENABLE_JS: &str = r"(function (v) {
  return v !== null && (typeof v === 'object' || typeof v === 'function')
    && typeof v.then === 'function';
})";

const WATCH_JS: &str = r"(function (v) {
  var slot = { resolved: false, rejected: false, value: undefined, error: '' };
  Promise.resolve(v).then(
    function (value) { slot.resolved = true; slot.value = value; },
    function (error) {
      slot.resolved = true;
      slot.rejected = true;
      try { slot.error = String(error); } catch (e) { slot.error = 'rejected'; }
    });
  return slot;
})";

const STRINGIFY_JS: &str = r"(function (v) {
  if (v === null || v === undefined) return '';
  if (typeof v === 'string') return v;
  var json = JSON.stringify(v);
  return json === undefined ? String(v) : json;
})";

/// Creates [`BoaRuntime`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoaFactory;

impl RuntimeFactory for BoaFactory {
    type Runtime = BoaRuntime;

    fn create(&self, config: &ScriptConfig) -> ScriptResult<BoaRuntime> {
        BoaRuntime::new(config)
    }
}

/// Helper functions evaluated once per runtime, before any untrusted code.
struct Helpers {
    thenable: JsObject,
    watch: JsObject,
    stringify: JsObject,
}

pub struct BoaRuntime {
    context: Context,
    helpers: Helpers,
}

impl BoaRuntime {
    /// ## Summary
    /// Creates an isolated context with the configured interpreter budgets.
    ///
    /// ## Errors
    /// Returns `Runtime` if the host function or helpers cannot be installed.
    pub fn new(config: &ScriptConfig) -> ScriptResult<Self> {
        let mut context = Context::default();
        context
            .runtime_limits_mut()
            .set_loop_iteration_limit(config.loop_iteration_limit);
        context
            .runtime_limits_mut()
            .set_recursion_limit(config.recursion_limit);

        context
            .register_global_callable(js_string!("__hostLog"), 2, NativeFunction::from_fn_ptr(host_log))
            .map_err(runtime_error)?;

        let helpers = Helpers {
            thenable: helper(&mut context, THENABLE_JS)?,
            watch: helper(&mut context, WATCH_JS)?,
            stringify: helper(&mut context, STRINGIFY_JS)?,
        };

        tracing::trace!(
            loop_iteration_limit = config.loop_iteration_limit,
            recursion_limit = config.recursion_limit,
            "Created script runtime"
        );
        Ok(Self { context, helpers })
    }

    /// Resolves a top-level binding by name, so `function`, `var`, `let`
    /// and `const` declarations are all visible.
    fn entry_function(&mut self, name: &str) -> JsResult<Option<JsObject>> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Ok(None);
        }
        let lookup = format!("typeof {name} === 'function' ? {name} : undefined");
        let value = self.context.eval(Source::from_bytes(lookup.as_bytes()))?;
        Ok(value.as_callable().cloned())
    }

    fn field(&mut self, object: &JsObject, name: &str) -> ScriptResult<JsValue> {
        object
            .get(JsString::from(name), &mut self.context)
            .map_err(runtime_error)
    }
}

impl ScriptRuntime for BoaRuntime {
    type Value = JsValue;
    type Watch = JsObject;

    fn load(&mut self, prelude: &str, script: &str) -> ScriptResult<()> {
        self.context
            .eval(Source::from_bytes(prelude))
            .map_err(runtime_error)?;
        self.context
            .eval(Source::from_bytes(script))
            .map_err(script_error)?;
        self.context.run_jobs();
        Ok(())
    }

    fn probe(&mut self) -> EntryPoints {
        let mut defined = |name: &str| self.entry_function(name).is_ok_and(|f| f.is_some());
        EntryPoints {
            provider: defined(ScriptContract::PROVIDER_FN),
            parser: defined(ScriptContract::PARSER_FN),
            timer: defined(ScriptContract::TIMER_FN),
            legacy_parse: defined(ScriptContract::LEGACY_FN),
        }
    }

    fn call(&mut self, function: &str, args: &[JsValue]) -> ScriptResult<JsValue> {
        let Some(callable) = self.entry_function(function).map_err(script_error)? else {
            return Err(ScriptExecutionError::Script(format!(
                "{function} is not a function"
            )));
        };
        callable
            .call(&JsValue::undefined(), args, &mut self.context)
            .map_err(script_error)
    }

    fn string(&mut self, text: &str) -> JsValue {
        JsValue::from(JsString::from(text))
    }

    fn undefined(&mut self) -> JsValue {
        JsValue::undefined()
    }

    fn object(&mut self, fields: &[(&str, JsValue)]) -> ScriptResult<JsValue> {
        let object = JsObject::with_object_proto(self.context.intrinsics());
        for (name, value) in fields {
            object
                .set(JsString::from(*name), value.clone(), true, &mut self.context)
                .map_err(runtime_error)?;
        }
        Ok(JsValue::from(object))
    }

    fn is_deferred(&mut self, value: &JsValue) -> bool {
        self.helpers
            .thenable
            .call(&JsValue::undefined(), &[value.clone()], &mut self.context)
            .is_ok_and(|result| result.to_boolean())
    }

    fn watch(&mut self, value: &JsValue) -> ScriptResult<JsObject> {
        let slot = self
            .helpers
            .watch
            .call(&JsValue::undefined(), &[value.clone()], &mut self.context)
            .map_err(script_error)?;
        slot.as_object()
            .cloned()
            .ok_or_else(|| ScriptExecutionError::Runtime("settlement slot is not an object".to_string()))
    }

    fn settlement(&mut self, watch: &JsObject) -> ScriptResult<Settlement<JsValue>> {
        let resolved = self.field(watch, "resolved")?.to_boolean();
        if !resolved {
            return Ok(Settlement::default());
        }

        if self.field(watch, "rejected")?.to_boolean() {
            let error = self
                .field(watch, "error")?
                .to_string(&mut self.context)
                .map_err(runtime_error)?
                .to_std_string_escaped();
            return Ok(Settlement {
                resolved,
                value: None,
                error: Some(error),
            });
        }

        Ok(Settlement {
            resolved,
            value: Some(self.field(watch, "value")?),
            error: None,
        })
    }

    fn drain_microtasks(&mut self) -> bool {
        self.context.run_jobs();
        true
    }

    fn stringify(&mut self, value: &JsValue) -> ScriptResult<String> {
        let text = self
            .helpers
            .stringify
            .call(&JsValue::undefined(), &[value.clone()], &mut self.context)
            .map_err(script_error)?;
        Ok(text
            .to_string(&mut self.context)
            .map_err(script_error)?
            .to_std_string_escaped())
    }
}

fn helper(context: &mut Context, source: &str) -> ScriptResult<JsObject> {
    let value = context
        .eval(Source::from_bytes(source))
        .map_err(runtime_error)?;
    value
        .as_callable()
        .cloned()
        .ok_or_else(|| ScriptExecutionError::Runtime("helper is not callable".to_string()))
}

/// `__hostLog(level, message)`
#[expect(clippy::unnecessary_wraps, reason = "NativeFunction signature")]
fn host_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let mut text = |index: usize| {
        args.get(index)
            .and_then(|value| value.to_string(context).ok())
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_default()
    };
    let level = text(0);
    let message = text(1);

    match level.as_str() {
        "error" => tracing::error!(target: "script", "{message}"),
        "warn" => tracing::warn!(target: "script", "{message}"),
        "debug" => tracing::debug!(target: "script", "{message}"),
        _ => tracing::info!(target: "script", "{message}"),
    }
    Ok(JsValue::undefined())
}

#[expect(clippy::needless_pass_by_value, reason = "map_err adapter")]
fn script_error(err: JsError) -> ScriptExecutionError {
    ScriptExecutionError::Script(err.to_string())
}

#[expect(clippy::needless_pass_by_value, reason = "map_err adapter")]
fn runtime_error(err: JsError) -> ScriptExecutionError {
    ScriptExecutionError::Runtime(err.to_string())
}
