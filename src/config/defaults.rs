//! Built-in host defaults
//!
//! Each host gets its own defaults object, including its own container
//! factory and hook closures.

use std::sync::Arc;

use super::options::{keys, DomGetter, Options, Props, Sandbox, SandboxConfig};
use crate::hooks::{
    Hook, HookContext, HookReturn, HookSet, ERROR_LIFECYCLE_KEYS, STANDARD_LIFECYCLE_KEYS,
};
use crate::logger::Logger;

/// Build the baseline global configuration.
///
/// With `nested` set, the host-only attributes are left out entirely so that
/// a nested host inherits them from its parent.
pub fn create_default_options(nested: bool, logger: Arc<dyn Logger>) -> Options {
    let mut options = Options {
        app_id: Some(String::new()),
        apps: Some(Vec::new()),
        auto_refresh_app: Some(true),
        disable_statistics: Some(false),
        disable_preload_app: Some(false),
        basename: Some("/".to_string()),
        props: Some(Props::new()),
        dom_getter: Some(DomGetter::fresh_div()),
        sandbox: Some(Sandbox::Settings(SandboxConfig::baseline())),
        custom_loader: None,
        hooks: default_hooks(logger),
        ..Options::default()
    };

    if nested {
        for key in keys::NESTED_INVALID {
            options.remove_key(key);
        }
    }
    options
}

fn default_hooks(logger: Arc<dyn Logger>) -> HookSet {
    STANDARD_LIFECYCLE_KEYS
        .iter()
        .map(|&name| {
            let hook = if ERROR_LIFECYCLE_KEYS.contains(&name) {
                forward_error(Arc::clone(&logger))
            } else {
                Hook::noop()
            };
            (name.to_string(), hook)
        })
        .collect()
}

fn forward_error(logger: Arc<dyn Logger>) -> Hook {
    Hook::from_fn(move |ctx: &mut HookContext| {
        let message = match (&ctx.error, &ctx.payload) {
            (Some(error), _) => error.to_string(),
            (None, Some(payload)) => payload.to_string(),
            (None, None) => "unknown lifecycle error".to_string(),
        };
        logger.error(&message);
        HookReturn::Done
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookError;
    use crate::logger::RecordingLogger;

    fn logger() -> Arc<RecordingLogger> {
        Arc::new(RecordingLogger::new())
    }

    #[test]
    fn test_defaults() {
        let defaults = create_default_options(false, logger());

        assert_eq!(defaults.app_id.as_deref(), Some(""));
        assert_eq!(defaults.apps.as_ref().map(Vec::len), Some(0));
        assert_eq!(defaults.auto_refresh_app, Some(true));
        assert_eq!(defaults.disable_statistics, Some(false));
        assert_eq!(defaults.disable_preload_app, Some(false));
        assert_eq!(defaults.basename.as_deref(), Some("/"));
        assert!(defaults.props.as_ref().unwrap().is_empty());
        assert_eq!(
            defaults.sandbox,
            Some(Sandbox::Settings(SandboxConfig::baseline()))
        );
        assert!(defaults.custom_loader.is_none());
        assert!(defaults.name.is_none());
        assert!(defaults.entry.is_none());
    }

    #[test]
    fn test_nested_defaults_omit_host_only_attributes() {
        let nested = create_default_options(true, logger());
        for key in keys::NESTED_INVALID {
            assert!(!nested.contains_key(key), "{} should be absent", key);
        }
        assert_eq!(nested.basename.as_deref(), Some("/"));

        let host = create_default_options(false, logger());
        for key in keys::NESTED_INVALID {
            assert!(host.contains_key(key), "{} should be present", key);
        }
    }

    #[test]
    fn test_every_standard_hook_present() {
        let defaults = create_default_options(false, logger());
        for name in STANDARD_LIFECYCLE_KEYS {
            assert!(defaults.hooks.contains_key(*name), "missing {}", name);
        }
    }

    #[test]
    fn test_error_hooks_forward_to_logger() {
        let logger = logger();
        let defaults = create_default_options(false, logger.clone());

        let mut ctx = HookContext::new().with_error(HookError::new("mount failed"));
        defaults.hooks["errorMountApp"].call(&mut ctx);
        defaults.hooks["beforeMount"].call(&mut HookContext::new());

        assert_eq!(logger.errors(), vec!["mount failed"]);
    }

    #[test]
    fn test_each_call_builds_fresh_values() {
        let first = create_default_options(false, logger());
        let second = create_default_options(false, logger());

        assert!(!first.hooks["beforeLoad"].ptr_eq(&second.hooks["beforeLoad"]));

        let a = first.dom_getter.as_ref().unwrap().create().unwrap();
        let b = first.dom_getter.as_ref().unwrap().create().unwrap();
        assert_ne!(a.id, b.id);
    }
}
