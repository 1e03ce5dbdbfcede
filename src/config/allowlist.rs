//! Attribute allow-list
//!
//! Per-application objects only ever carry the fixed application attributes
//! and the host's lifecycle hooks. Host-only settings (the static app list,
//! feature flags) and unknown keys are dropped after merging.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::merge::merge_options;
use super::options::{keys, Options};
use crate::hooks::LifecycleKeys;

/// Application attributes that always pass the allow-list
pub const FIXED_ATTRIBUTES: [&str; 11] = [
    keys::NAME,
    keys::ENTRY,
    keys::ACTIVE_WHEN,
    keys::BASENAME,
    keys::DOM_GETTER,
    keys::PROPS,
    keys::SANDBOX,
    keys::CACHE,
    keys::NESTED,
    keys::NO_CHECK_PROVIDER,
    keys::CUSTOM_LOADER,
];

/// Allowed keys, fixed once built
#[derive(Debug, Clone)]
pub struct AttributeAllowlist {
    keys: Arc<BTreeSet<String>>,
    hook_names: Arc<BTreeSet<String>>,
}

impl AttributeAllowlist {
    /// Fixed attributes unioned with the given hook names
    pub fn new(lifecycle_keys: &LifecycleKeys) -> Self {
        let hook_names: BTreeSet<String> = lifecycle_keys.iter().map(str::to_string).collect();
        let keys = FIXED_ATTRIBUTES
            .iter()
            .map(|key| key.to_string())
            .chain(hook_names.iter().cloned())
            .collect();
        Self {
            keys: Arc::new(keys),
            hook_names: Arc::new(hook_names),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Merge `local` over `global` and keep only allowed keys
    pub fn resolve_allowed(&self, global: &Options, local: &Options) -> Options {
        let mut merged = merge_options(global, local);
        merged.retain_keys(|key| self.contains(key));
        // a lifecycle name only ever holds a hook
        merged.extra.retain(|key, _| !self.hook_names.contains(key));
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hook;
    use serde_json::json;

    fn allowlist() -> AttributeAllowlist {
        AttributeAllowlist::new(&LifecycleKeys::new(["beforeMount", "afterMount"]))
    }

    #[test]
    fn test_contains_fixed_and_hooks() {
        let allowlist = allowlist();
        for key in FIXED_ATTRIBUTES {
            assert!(allowlist.contains(key));
        }
        assert!(allowlist.contains("beforeMount"));
        assert!(!allowlist.contains("beforeLoad"));
        assert!(!allowlist.contains("apps"));
        assert_eq!(allowlist.iter().count(), FIXED_ATTRIBUTES.len() + 2);
    }

    #[test]
    fn test_global_only_fields_do_not_leak() {
        let mut global = Options::new().with_basename("/");
        global.app_id = Some("host".to_string());
        global.apps = Some(vec![Options::app("a", "a.html")]);
        global.auto_refresh_app = Some(true);
        global.disable_statistics = Some(false);
        global.disable_preload_app = Some(false);

        let resolved = allowlist().resolve_allowed(&global, &Options::app("b", "b.html"));

        assert_eq!(resolved.keys(), vec!["name", "entry", "basename"]);
    }

    #[test]
    fn test_unknown_hooks_and_extras_dropped() {
        let global = Options::new()
            .with_hook("beforeMount", Hook::noop())
            .with_hook("beforeLoad", Hook::noop());
        let local = Options::new().with_extra("stray", json!(1));

        let resolved = allowlist().resolve_allowed(&global, &local);

        assert_eq!(resolved.keys(), vec!["beforeMount"]);
    }

    #[test]
    fn test_keys_are_closed_over_allowlist() {
        let allowlist = allowlist();
        let mut global = Options::app("g", "g.html")
            .with_hook("afterMount", Hook::noop())
            .with_hook("errorLoadApp", Hook::noop())
            .with_extra("meta", json!({}));
        global.app_id = Some("id".to_string());
        let local = Options::new().with_cache(true);

        let resolved = allowlist.resolve_allowed(&global, &local);

        for key in resolved.keys() {
            assert!(allowlist.contains(key), "{} leaked", key);
        }
    }

    #[test]
    fn test_colliding_extras_never_duplicate_keys() {
        let lifecycle = LifecycleKeys::new(["beforeMount", "customStage"]);
        let allowlist = AttributeAllowlist::new(&lifecycle);
        let global = Options::new().with_hook("beforeMount", Hook::noop());
        let mut local = Options::app("a", "a.html");
        local.extra.insert("entry".into(), json!("x.html"));
        local.extra.insert("customLoader".into(), json!("legacy"));
        local.extra.insert("beforeMount".into(), json!("x"));
        local.extra.insert("customStage".into(), json!("x"));

        let resolved = allowlist.resolve_allowed(&global, &local);

        assert_eq!(resolved.keys(), vec!["name", "entry", "beforeMount"]);
        assert!(resolved.custom_loader.is_none());
        assert_eq!(resolved.to_value()["entry"], json!("a.html"));
    }
}
