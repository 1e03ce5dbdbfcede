//! Nested scope guard
//!
//! A nested context (an application that is itself a host) must not carry
//! host-only attributes, and its lifecycle hooks must tag the application they
//! are called for with the nesting slot.

use crate::config::{keys, Nested, NestedId, Options};
use crate::host::Host;

use super::{Hook, HookContext, HookReturn, LifecycleHook};

/// Hook wrapper that stamps the nesting slot onto the context's application.
///
/// The wrapped hook is always called exactly once and its return value is
/// handed back untouched, pending or not.
pub struct NestedHookAdapter {
    inner: Hook,
    nested_id: NestedId,
}

impl NestedHookAdapter {
    pub fn new(inner: Hook, nested_id: NestedId) -> Self {
        Self { inner, nested_id }
    }

    pub fn nested_id(&self) -> NestedId {
        self.nested_id
    }
}

impl LifecycleHook for NestedHookAdapter {
    fn call(&self, ctx: &mut HookContext) -> HookReturn {
        if let Some(app) = ctx.app.as_mut() {
            app.nested = Some(Nested::Slot(self.nested_id));
        }
        self.inner.call(ctx)
    }
}

/// Strip host-only attributes and wrap hooks of a nested config, in place.
///
/// Does nothing unless `config` is flagged nested. Must only be applied to a
/// config produced for this one load, never to a shared one.
pub fn guard<'a>(host: &Host, config: &'a mut Options, nested_id: NestedId) -> &'a mut Options {
    if !config.is_nested() {
        return config;
    }

    for key in keys::NESTED_INVALID {
        if config.remove_key(key) {
            host.logger().warn(&format!(
                "Nested scene does not support the configuration \"{}\".",
                key
            ));
        }
    }

    for key in host.lifecycle_keys().iter() {
        if let Some(hook) = config.hooks.remove(key) {
            config.hooks.insert(
                key.to_string(),
                Hook::new(NestedHookAdapter::new(hook, nested_id)),
            );
        }
    }

    config
}
