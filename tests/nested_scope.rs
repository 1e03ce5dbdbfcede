//! Nested scope tests
//!
//! A host running inside another host: nested defaults, attribute stripping
//! with warnings, and hook wrapping on resolved options.

use mfe_options::config::{keys, Nested, Sandbox, SandboxConfig};
use mfe_options::hooks::{guard, HookError};
use mfe_options::logger::RecordingLogger;
use mfe_options::{Hook, HookContext, HookReturn, Host, LifecycleKeys, LoadOverride, Options};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn recording_host() -> (Host, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::new());
    let host = Host::builder()
        .lifecycle_keys(LifecycleKeys::standard())
        .logger(logger.clone())
        .build()
        .unwrap();
    (host, logger)
}

#[test]
fn test_guard_strips_sandbox_and_tags_hook_argument() {
    let (host, logger) = recording_host();
    let observed = Arc::new(Mutex::new(None));
    let before_mount = {
        let observed = Arc::clone(&observed);
        Hook::from_fn(move |ctx| {
            *observed.lock().unwrap() = ctx.app.as_ref().and_then(|app| app.nested);
            HookReturn::Done
        })
    };

    let mut config = Options::new()
        .with_nested(Nested::Flag(true))
        .with_sandbox(Sandbox::Settings(SandboxConfig {
            snapshot: Some(true),
            ..SandboxConfig::default()
        }))
        .with_hook("beforeMount", before_mount);

    let result = guard(&host, &mut config, 3);

    assert!(!result.contains_key(keys::SANDBOX));
    assert_eq!(logger.warnings().len(), 1);

    let mut ctx = HookContext::for_app(Options::app("child", "child.html"));
    result.hooks["beforeMount"].call(&mut ctx);

    assert_eq!(*observed.lock().unwrap(), Some(Nested::Slot(3)));
}

#[test]
fn test_nested_host_defaults_lack_host_only_attributes() {
    let nested = Host::builder().nested(true).build().unwrap();
    let top = Host::builder().nested(false).build().unwrap();

    for key in keys::NESTED_INVALID {
        assert!(!nested.global_config().contains_key(key));
        assert!(top.global_config().contains_key(key));
    }
    assert_eq!(top.global_config().auto_refresh_app, Some(true));
    assert_eq!(top.global_config().disable_statistics, Some(false));
    assert_eq!(top.global_config().disable_preload_app, Some(false));
}

#[test]
fn test_guard_on_resolved_options() {
    let (host, logger) = recording_host();
    let calls = Arc::new(AtomicUsize::new(0));
    let after_load = {
        let calls = Arc::clone(&calls);
        Hook::from_fn(move |ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            HookReturn::Value(json!(ctx.app.as_ref().and_then(|app| app.nested)))
        })
    };

    let mut resolved = host
        .resolve(
            "child",
            Options::new()
                .with_entry("child.html")
                .with_nested(Nested::Flag(true))
                .with_hook("afterLoad", after_load),
        )
        .unwrap();
    resolved.guard_nested(&host, 9);

    // the global default sandbox made it through resolution, then got stripped
    assert!(resolved.sandbox.is_none());
    assert_eq!(
        logger.warnings(),
        vec!["Nested scene does not support the configuration \"sandbox\"."]
    );

    let mut ctx = HookContext::for_app(resolved.options().clone());
    let result = resolved.hooks["afterLoad"].call(&mut ctx);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(result, HookReturn::Value(v) if v == json!(9)));
    assert_eq!(resolved.name(), "child");
}

#[test]
fn test_wrapped_default_error_hook_still_logs() {
    let (host, logger) = recording_host();
    let mut resolved = host
        .resolve(
            "child",
            Options::new()
                .with_entry("child.html")
                .with_nested(Nested::Slot(4)),
        )
        .unwrap();
    resolved.guard_nested(&host, 4);

    let mut ctx = HookContext::for_app(Options::app("child", "child.html"))
        .with_error(HookError::new("mount exploded"));
    resolved.hooks["errorMountApp"].call(&mut ctx);

    assert_eq!(logger.errors(), vec!["mount exploded"]);
    assert_eq!(ctx.app.unwrap().nested, Some(Nested::Slot(4)));
}

#[test]
fn test_guard_leaves_shared_registration_untouched() {
    let (mut host, _) = recording_host();
    let hook = Hook::noop();
    host.register(
        Options::app("child", "child.html")
            .with_nested(Nested::Flag(true))
            .with_hook("beforeMount", hook.clone()),
    )
    .unwrap();

    let mut resolved = host.resolve("child", LoadOverride::None).unwrap();
    resolved.guard_nested(&host, 1);

    assert!(!resolved.hooks["beforeMount"].ptr_eq(&hook));
    assert!(host.app("child").unwrap().hooks["beforeMount"].ptr_eq(&hook));
}

#[test]
fn test_guard_is_noop_without_nested_flag() {
    let (host, logger) = recording_host();
    let mut resolved = host.resolve("plain", "plain.html").unwrap();
    let before = resolved.hooks["beforeMount"].clone();

    resolved.guard_nested(&host, 1);

    assert!(resolved.sandbox.is_some());
    assert!(resolved.hooks["beforeMount"].ptr_eq(&before));
    assert!(logger.warnings().is_empty());
}
