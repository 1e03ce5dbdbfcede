//! Lifecycle hooks
//!
//! Hooks are named callbacks invoked by the lifecycle dispatcher. Every hook
//! receives a [`HookContext`] describing the invocation instead of a loose
//! argument list, and returns a [`HookReturn`] that may be immediate or
//! pending.

mod nested;

pub use nested::{guard, NestedHookAdapter};

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Options;

/// Hook names a host recognizes unless told otherwise
pub const STANDARD_LIFECYCLE_KEYS: &[&str] = &[
    "beforeLoad",
    "afterLoad",
    "errorLoadApp",
    "onNotMatchRouter",
    "beforeEval",
    "afterEval",
    "beforeMount",
    "afterMount",
    "beforeUnmount",
    "afterUnmount",
    "errorMountApp",
    "errorUnmountApp",
];

/// Error-class hooks; their defaults forward to the logger
pub const ERROR_LIFECYCLE_KEYS: &[&str] = &["errorLoadApp", "errorMountApp", "errorUnmountApp"];

/// Hooks keyed by name
pub type HookSet = BTreeMap<String, Hook>;

/// Error carried into or out of a lifecycle hook
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a hook is invoked with
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    /// The application the invocation concerns, if any
    pub app: Option<Options>,

    /// Error being reported, for error-class hooks
    pub error: Option<HookError>,

    /// Any further hook-specific data (route, evaluated code, ...)
    pub payload: Option<Value>,
}

impl HookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_app(app: Options) -> Self {
        Self {
            app: Some(app),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: HookError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Result of running a hook
pub enum HookReturn {
    Done,
    Value(Value),
    /// Work the dispatcher has to drive to completion
    Pending(Pin<Box<dyn Future<Output = Result<Value, HookError>> + Send>>),
}

impl HookReturn {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, HookError>> + Send + 'static,
    {
        HookReturn::Pending(Box::pin(future))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, HookReturn::Pending(_))
    }
}

impl fmt::Debug for HookReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookReturn::Done => f.write_str("Done"),
            HookReturn::Value(value) => f.debug_tuple("Value").field(value).finish(),
            HookReturn::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A lifecycle callback
pub trait LifecycleHook: Send + Sync {
    fn call(&self, ctx: &mut HookContext) -> HookReturn;
}

impl<F> LifecycleHook for F
where
    F: Fn(&mut HookContext) -> HookReturn + Send + Sync,
{
    fn call(&self, ctx: &mut HookContext) -> HookReturn {
        self(ctx)
    }
}

/// Shared handle to a lifecycle callback
#[derive(Clone)]
pub struct Hook(Arc<dyn LifecycleHook>);

impl Hook {
    pub fn new<H: LifecycleHook + 'static>(hook: H) -> Self {
        Hook(Arc::new(hook))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut HookContext) -> HookReturn + Send + Sync + 'static,
    {
        Hook(Arc::new(f))
    }

    pub fn noop() -> Self {
        Hook::from_fn(|_| HookReturn::Done)
    }

    pub fn call(&self, ctx: &mut HookContext) -> HookReturn {
        self.0.call(ctx)
    }

    /// Whether both handles refer to the same callback
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const u8,
            Arc::as_ptr(&other.0) as *const u8,
        )
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Ordered, de-duplicated hook names recognized by a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleKeys(Vec<String>);

impl LifecycleKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        LifecycleKeys(unique)
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_LIFECYCLE_KEYS.iter().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LifecycleKeys {
    fn default() -> Self {
        Self::standard()
    }
}
