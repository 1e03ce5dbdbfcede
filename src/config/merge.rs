//! Configuration merge logic
//!
//! Two levels of merge live here:
//! - JSON values: objects deep-merge by key, arrays and scalars are replaced
//! - [`Options`]: every field follows the same rule, except `props`, which is
//!   overlaid one level deep so the values inside it keep their identity

use serde_json::{Map, Value};

use super::options::{Options, Props, Sandbox, SandboxConfig};

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }

        // Arrays: REPLACE (no concatenation)
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Deep merge two JSON objects
pub fn merge_maps(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        let merged = if let Some(base_value) = base.remove(&key) {
            deep_merge(base_value, overlay_value)
        } else {
            overlay_value
        };
        base.insert(key, merged);
    }
    base
}

/// Merge a global config with a local one, local taking precedence.
///
/// Neither input is modified. `props` is rebuilt as a new mapping holding the
/// global entries overlaid with the local ones; the entries themselves are
/// shared, not copied. Extras that would shadow a merged hook are dropped.
pub fn merge_options(global: &Options, local: &Options) -> Options {
    let mut hooks = global.hooks.clone();
    hooks.extend(local.hooks.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut merged = Options {
        app_id: overlay(&global.app_id, &local.app_id),
        apps: overlay(&global.apps, &local.apps),
        auto_refresh_app: overlay(&global.auto_refresh_app, &local.auto_refresh_app),
        disable_statistics: overlay(&global.disable_statistics, &local.disable_statistics),
        disable_preload_app: overlay(&global.disable_preload_app, &local.disable_preload_app),
        name: overlay(&global.name, &local.name),
        entry: overlay(&global.entry, &local.entry),
        active_when: overlay(&global.active_when, &local.active_when),
        basename: overlay(&global.basename, &local.basename),
        dom_getter: overlay(&global.dom_getter, &local.dom_getter),
        props: merge_props(global.props.as_ref(), local.props.as_ref()),
        sandbox: merge_sandbox(global.sandbox.as_ref(), local.sandbox.as_ref()),
        cache: overlay(&global.cache, &local.cache),
        nested: overlay(&global.nested, &local.nested),
        no_check_provider: overlay(&global.no_check_provider, &local.no_check_provider),
        custom_loader: overlay(&global.custom_loader, &local.custom_loader),
        hooks,
        extra: merge_maps(global.extra.clone(), local.extra.clone()),
    };
    merged.drop_shadowed_extras();
    merged
}

/// Shallow overlay of two props mappings; `None` when neither side has props
pub fn merge_props(global: Option<&Props>, local: Option<&Props>) -> Option<Props> {
    if global.is_none() && local.is_none() {
        return None;
    }
    let mut merged = global.cloned().unwrap_or_default();
    if let Some(local) = local {
        for (key, value) in local.iter() {
            merged.insert(key, value.clone());
        }
    }
    Some(merged)
}

/// Settings objects merge key-wise; a toggle on either side replaces
pub fn merge_sandbox(global: Option<&Sandbox>, local: Option<&Sandbox>) -> Option<Sandbox> {
    match (global, local) {
        (Some(Sandbox::Settings(global)), Some(Sandbox::Settings(local))) => {
            Some(Sandbox::Settings(merge_sandbox_config(global, local)))
        }
        (global, local) => local.or(global).cloned(),
    }
}

fn merge_sandbox_config(global: &SandboxConfig, local: &SandboxConfig) -> SandboxConfig {
    SandboxConfig {
        snapshot: local.snapshot.or(global.snapshot),
        disable_with: local.disable_with.or(global.disable_with),
        strict_isolation: local.strict_isolation.or(global.strict_isolation),
        extra: merge_maps(global.extra.clone(), local.extra.clone()),
    }
}

fn overlay<T: Clone>(global: &Option<T>, local: &Option<T>) -> Option<T> {
    local.as_ref().or(global.as_ref()).cloned()
}
