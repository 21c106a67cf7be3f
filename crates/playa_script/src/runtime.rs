//! Script runtime management
//!
//! Thin wrapper over a QuickJS runtime and its single context.

use crate::ScriptError;
use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Function, Object, Runtime};
use std::path::Path;

/// Resource caps applied to a fresh runtime.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RuntimeLimits {
    pub memory_limit_bytes: Option<usize>,
    pub max_stack_size_bytes: Option<usize>,
}

/// Script execution context
pub struct ScriptRuntime {
    context: Context,
    #[allow(dead_code)] // Kept alive for context lifetime
    runtime: Runtime,
}

impl ScriptRuntime {
    pub fn new(limits: RuntimeLimits) -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        if let Some(bytes) = limits.memory_limit_bytes {
            runtime.set_memory_limit(bytes);
        }
        if let Some(bytes) = limits.max_stack_size_bytes {
            runtime.set_max_stack_size(bytes);
        }
        let context = Context::full(&runtime)?;

        Ok(Self { context, runtime })
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::AssetRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.execute(&source)
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.context.with(|ctx| caught(&ctx, ctx.eval::<(), _>(source)))
    }

    /// Make the global object reachable as `window`, for bundles built for browsers.
    pub fn expose_global_as_window(&self) -> Result<(), ScriptError> {
        self.context.with(|ctx| -> Result<(), ScriptError> {
            let globals = ctx.globals();
            globals.set("window", globals.clone())?;
            Ok(())
        })
    }

    /// Call the zero-argument global `name` and store its return value as the global `target`.
    pub fn call_into_global(&self, name: &str, target: &str) -> Result<(), ScriptError> {
        self.context.with(|ctx| -> Result<(), ScriptError> {
            let globals = ctx.globals();
            let func = global_function(&globals, name)?;
            let value: rquickjs::Value = caught(&ctx, func.call(()))?;
            globals.set(target, value)?;
            Ok(())
        })
    }

    /// Run `f` against the context.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }
}

/// Fetch a global function by name.
pub fn global_function<'js>(
    globals: &Object<'js>,
    name: &str,
) -> Result<Function<'js>, ScriptError> {
    globals
        .get::<_, Option<Function>>(name)?
        .ok_or_else(|| ScriptError::MissingFunction {
            name: name.to_owned(),
        })
}

/// Convert a pending JS exception into a [`ScriptError`], draining it from the context.
pub fn caught<'js, T>(ctx: &Ctx<'js>, result: rquickjs::Result<T>) -> Result<T, ScriptError> {
    result.catch(ctx).map_err(|err| match err {
        CaughtError::Error(err) => ScriptError::Interpreter(err),
        other => ScriptError::Exception {
            message: other.to_string(),
        },
    })
}

/// JavaScript truthiness, for the values lookup primitives return.
pub fn is_falsy(value: &rquickjs::Value<'_>) -> bool {
    if value.is_undefined() || value.is_null() {
        return true;
    }
    if let Some(b) = value.as_bool() {
        return !b;
    }
    if let Some(i) = value.as_int() {
        return i == 0;
    }
    if let Some(f) = value.as_float() {
        return f == 0.0 || f.is_nan();
    }
    if let Some(s) = value.as_string() {
        return s.to_string().map(|s| s.is_empty()).unwrap_or(true);
    }
    false
}
