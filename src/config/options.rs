//! Configuration records
//!
//! [`Options`] is the one record shape shared by the global configuration,
//! registration records and load-time overrides. Every field is optional; an
//! absent field is not part of the object at all, which is what the merge and
//! the allow-list operate on.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hooks::{Hook, HookSet, STANDARD_LIFECYCLE_KEYS};

/// Identifier of the nesting slot an application runs in
pub type NestedId = u64;

/// Rendering used by [`Options::to_value`] for values that are callables
pub const FUNCTION_PLACEHOLDER: &str = "[function]";

/// Rendering used by [`Options::to_value`] for opaque shared props
pub const SHARED_PLACEHOLDER: &str = "[shared]";

/// Attribute keys as they appear on configuration objects
pub mod keys {
    pub const APP_ID: &str = "appID";
    pub const APPS: &str = "apps";
    pub const AUTO_REFRESH_APP: &str = "autoRefreshApp";
    pub const DISABLE_STATISTICS: &str = "disableStatistics";
    pub const DISABLE_PRELOAD_APP: &str = "disablePreloadApp";
    pub const NAME: &str = "name";
    pub const ENTRY: &str = "entry";
    pub const ACTIVE_WHEN: &str = "activeWhen";
    pub const BASENAME: &str = "basename";
    pub const DOM_GETTER: &str = "domGetter";
    pub const PROPS: &str = "props";
    pub const SANDBOX: &str = "sandbox";
    pub const CACHE: &str = "cache";
    pub const NESTED: &str = "nested";
    pub const NO_CHECK_PROVIDER: &str = "noCheckProvider";
    pub const CUSTOM_LOADER: &str = "customLoader";

    /// Every key backed by a typed field, in declaration order
    pub const FIELD_KEYS: [&str; 16] = [
        APP_ID,
        APPS,
        AUTO_REFRESH_APP,
        DISABLE_STATISTICS,
        DISABLE_PRELOAD_APP,
        NAME,
        ENTRY,
        ACTIVE_WHEN,
        BASENAME,
        DOM_GETTER,
        PROPS,
        SANDBOX,
        CACHE,
        NESTED,
        NO_CHECK_PROVIDER,
        CUSTOM_LOADER,
    ];

    /// Host-only attributes a nested context inherits from its parent
    pub const NESTED_INVALID: [&str; 4] = [
        SANDBOX,
        AUTO_REFRESH_APP,
        DISABLE_STATISTICS,
        DISABLE_PRELOAD_APP,
    ];

    /// Whether `key` is backed by a typed field of `Options`
    pub fn is_field_key(key: &str) -> bool {
        FIELD_KEYS.contains(&key)
    }
}

/// Nesting marker: a plain flag on input, a slot id once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested {
    Flag(bool),
    Slot(NestedId),
}

impl Nested {
    /// Whether this marker puts the config in a nested context
    pub fn is_active(self) -> bool {
        match self {
            Nested::Flag(flag) => flag,
            Nested::Slot(id) => id != 0,
        }
    }
}

/// Sandbox settings object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_with: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_isolation: Option<bool>,

    /// Settings this crate does not interpret, passed through to the sandbox
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SandboxConfig {
    /// Baseline settings: every isolation switch off
    pub fn baseline() -> Self {
        Self {
            snapshot: Some(false),
            disable_with: Some(false),
            strict_isolation: Some(false),
            extra: Map::new(),
        }
    }
}

/// Sandbox attribute: either a bare toggle or a settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sandbox {
    Toggle(bool),
    Settings(SandboxConfig),
}

/// A single `props` value.
///
/// Values are held behind `Arc` so that copying a props mapping never copies
/// what is inside it; a store observed elsewhere stays the same object.
#[derive(Clone)]
pub enum PropValue {
    /// Plain data, e.g. from a config file
    Data(Arc<Value>),
    /// Any live object owned by the embedding application
    Shared(Arc<dyn Any + Send + Sync>),
}

impl PropValue {
    pub fn data(value: Value) -> Self {
        PropValue::Data(Arc::new(value))
    }

    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        PropValue::Shared(value)
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            PropValue::Data(value) => Some(&**value),
            PropValue::Shared(_) => None,
        }
    }

    /// Recover a shared object by type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            PropValue::Shared(value) => Arc::clone(value).downcast::<T>().ok(),
            PropValue::Data(_) => None,
        }
    }

    /// Whether both values point at the same object
    pub fn ptr_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Data(a), PropValue::Data(b)) => Arc::ptr_eq(a, b),
            (PropValue::Shared(a), PropValue::Shared(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Data(value) => f.debug_tuple("Data").field(value).finish(),
            PropValue::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

/// The `props` mapping handed to an application
#[derive(Debug, Clone, Default)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PropValue) -> Option<PropValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON view; shared objects are rendered as a placeholder
    pub fn to_value(&self) -> Value {
        let map = self
            .0
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    PropValue::Data(data) => Value::clone(data),
                    PropValue::Shared(_) => Value::String(SHARED_PLACEHOLDER.to_string()),
                };
                (key.clone(), rendered)
            })
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, PropValue)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        Props(iter.into_iter().collect())
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, PropValue::data(value)))
            .collect()
    }
}

/// Route predicate deciding when an application is active
#[derive(Clone)]
pub enum ActiveWhen {
    /// Active on this path and everything below it
    Path(String),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl ActiveWhen {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ActiveWhen::Predicate(Arc::new(predicate))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            ActiveWhen::Path(prefix) => path_has_prefix(path, prefix),
            ActiveWhen::Predicate(predicate) => predicate(path),
        }
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => {
            rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('#')
        }
        None => false,
    }
}

impl fmt::Debug for ActiveWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveWhen::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ActiveWhen::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// A container element created for an application to mount into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerElement {
    pub tag_name: String,
    /// Unique per created element
    pub id: u64,
}

impl ContainerElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// Where an application's container comes from
#[derive(Clone)]
pub enum DomGetter {
    /// Selector resolved by the mounting collaborator
    Selector(String),
    Factory(Arc<dyn Fn() -> ContainerElement + Send + Sync>),
}

impl DomGetter {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> ContainerElement + Send + Sync + 'static,
    {
        DomGetter::Factory(Arc::new(factory))
    }

    /// Factory producing a new empty `div` on every call
    pub fn fresh_div() -> Self {
        DomGetter::factory(|| ContainerElement::new("div"))
    }

    /// Create a container, if this getter is a factory
    pub fn create(&self) -> Option<ContainerElement> {
        match self {
            DomGetter::Factory(factory) => Some(factory()),
            DomGetter::Selector(_) => None,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            DomGetter::Selector(selector) => Some(selector.as_str()),
            DomGetter::Factory(_) => None,
        }
    }
}

impl fmt::Debug for DomGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomGetter::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            DomGetter::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Deprecated loader hook, carried through untouched
#[derive(Clone)]
pub struct CustomLoader(Arc<dyn Any + Send + Sync>);

impl CustomLoader {
    pub fn new<T: Any + Send + Sync>(loader: T) -> Self {
        CustomLoader(Arc::new(loader))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomLoader(..)")
    }
}

/// Host or application configuration object
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Registry identifier (host only)
    pub app_id: Option<String>,

    /// Static app declarations (host only)
    pub apps: Option<Vec<Options>>,

    pub auto_refresh_app: Option<bool>,
    pub disable_statistics: Option<bool>,
    pub disable_preload_app: Option<bool>,

    pub name: Option<String>,
    pub entry: Option<String>,
    pub active_when: Option<ActiveWhen>,
    pub basename: Option<String>,
    pub dom_getter: Option<DomGetter>,
    pub props: Option<Props>,
    pub sandbox: Option<Sandbox>,
    pub cache: Option<bool>,
    pub nested: Option<Nested>,
    pub no_check_provider: Option<bool>,
    pub custom_loader: Option<CustomLoader>,

    /// Lifecycle hooks by name
    pub hooks: HookSet,

    /// Keys with no typed field
    pub extra: Map<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration record with a name and an entry
    pub fn app(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self::new().with_name(name).with_entry(entry)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    pub fn with_active_when(mut self, active_when: ActiveWhen) -> Self {
        self.active_when = Some(active_when);
        self
    }

    pub fn with_dom_getter(mut self, dom_getter: DomGetter) -> Self {
        self.dom_getter = Some(dom_getter);
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    pub fn with_sandbox(mut self, sandbox: Sandbox) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_nested(mut self, nested: Nested) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn with_hook(mut self, name: impl Into<String>, hook: Hook) -> Self {
        let name = name.into();
        self.extra.remove(&name);
        self.hooks.insert(name, hook);
        self
    }

    /// Set a free-form key; ignored when `key` names a typed field or a hook
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !shadows_slot(&self.hooks, &key) {
            self.extra.insert(key, value);
        }
        self
    }

    /// Drop extras that collide with a typed field or a hook slot
    pub fn drop_shadowed_extras(&mut self) {
        let hooks = &self.hooks;
        self.extra.retain(|key, _| !shadows_slot(hooks, key));
    }

    /// Whether this config belongs to a nested context
    pub fn is_nested(&self) -> bool {
        self.nested.is_some_and(Nested::is_active)
    }

    /// Keys present on this object: typed fields, then hooks, then extras
    pub fn keys(&self) -> Vec<&str> {
        let mut present: Vec<&str> = keys::FIELD_KEYS
            .iter()
            .copied()
            .filter(|key| self.field_present(key) == Some(true))
            .collect();
        present.extend(self.hooks.keys().map(String::as_str));
        present.extend(self.extra.keys().map(String::as_str));
        present
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match self.field_present(key) {
            Some(present) => present,
            None => self.hooks.contains_key(key) || self.extra.contains_key(key),
        }
    }

    /// Remove a key, returning whether it was present
    pub fn remove_key(&mut self, key: &str) -> bool {
        if let Some(removed) = self.take_field(key) {
            return removed;
        }
        let hook_removed = self.hooks.remove(key).is_some();
        let extra_removed = self.extra.remove(key).is_some();
        hook_removed || extra_removed
    }

    /// Drop every key for which `keep` returns false
    pub fn retain_keys<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        for key in keys::FIELD_KEYS {
            if !keep(key) {
                self.take_field(key);
            }
        }
        self.hooks.retain(|name, _| keep(name.as_str()));
        let hooks = &self.hooks;
        self.extra
            .retain(|key, _| keep(key.as_str()) && !shadows_slot(hooks, key));
    }

    /// `None` when `key` is not a typed field
    fn field_present(&self, key: &str) -> Option<bool> {
        let present = match key {
            keys::APP_ID => self.app_id.is_some(),
            keys::APPS => self.apps.is_some(),
            keys::AUTO_REFRESH_APP => self.auto_refresh_app.is_some(),
            keys::DISABLE_STATISTICS => self.disable_statistics.is_some(),
            keys::DISABLE_PRELOAD_APP => self.disable_preload_app.is_some(),
            keys::NAME => self.name.is_some(),
            keys::ENTRY => self.entry.is_some(),
            keys::ACTIVE_WHEN => self.active_when.is_some(),
            keys::BASENAME => self.basename.is_some(),
            keys::DOM_GETTER => self.dom_getter.is_some(),
            keys::PROPS => self.props.is_some(),
            keys::SANDBOX => self.sandbox.is_some(),
            keys::CACHE => self.cache.is_some(),
            keys::NESTED => self.nested.is_some(),
            keys::NO_CHECK_PROVIDER => self.no_check_provider.is_some(),
            keys::CUSTOM_LOADER => self.custom_loader.is_some(),
            _ => return None,
        };
        Some(present)
    }

    /// Clear a typed field; `None` when `key` is not a typed field
    fn take_field(&mut self, key: &str) -> Option<bool> {
        let removed = match key {
            keys::APP_ID => self.app_id.take().is_some(),
            keys::APPS => self.apps.take().is_some(),
            keys::AUTO_REFRESH_APP => self.auto_refresh_app.take().is_some(),
            keys::DISABLE_STATISTICS => self.disable_statistics.take().is_some(),
            keys::DISABLE_PRELOAD_APP => self.disable_preload_app.take().is_some(),
            keys::NAME => self.name.take().is_some(),
            keys::ENTRY => self.entry.take().is_some(),
            keys::ACTIVE_WHEN => self.active_when.take().is_some(),
            keys::BASENAME => self.basename.take().is_some(),
            keys::DOM_GETTER => self.dom_getter.take().is_some(),
            keys::PROPS => self.props.take().is_some(),
            keys::SANDBOX => self.sandbox.take().is_some(),
            keys::CACHE => self.cache.take().is_some(),
            keys::NESTED => self.nested.take().is_some(),
            keys::NO_CHECK_PROVIDER => self.no_check_provider.take().is_some(),
            keys::CUSTOM_LOADER => self.custom_loader.take().is_some(),
            _ => return None,
        };
        Some(removed)
    }

    /// JSON view of this object; callables are rendered as placeholders
    pub fn to_value(&self) -> Value {
        let function = || Value::String(FUNCTION_PLACEHOLDER.to_string());
        let mut map = Map::new();

        if let Some(app_id) = &self.app_id {
            map.insert(keys::APP_ID.into(), Value::String(app_id.clone()));
        }
        if let Some(apps) = &self.apps {
            map.insert(
                keys::APPS.into(),
                Value::Array(apps.iter().map(Options::to_value).collect()),
            );
        }
        for (key, flag) in [
            (keys::AUTO_REFRESH_APP, self.auto_refresh_app),
            (keys::DISABLE_STATISTICS, self.disable_statistics),
            (keys::DISABLE_PRELOAD_APP, self.disable_preload_app),
            (keys::CACHE, self.cache),
            (keys::NO_CHECK_PROVIDER, self.no_check_provider),
        ] {
            if let Some(flag) = flag {
                map.insert(key.into(), Value::Bool(flag));
            }
        }
        for (key, text) in [
            (keys::NAME, &self.name),
            (keys::ENTRY, &self.entry),
            (keys::BASENAME, &self.basename),
        ] {
            if let Some(text) = text {
                map.insert(key.into(), Value::String(text.clone()));
            }
        }
        if let Some(active_when) = &self.active_when {
            let rendered = match active_when {
                ActiveWhen::Path(path) => Value::String(path.clone()),
                ActiveWhen::Predicate(_) => function(),
            };
            map.insert(keys::ACTIVE_WHEN.into(), rendered);
        }
        if let Some(dom_getter) = &self.dom_getter {
            let rendered = match dom_getter {
                DomGetter::Selector(selector) => Value::String(selector.clone()),
                DomGetter::Factory(_) => function(),
            };
            map.insert(keys::DOM_GETTER.into(), rendered);
        }
        if let Some(props) = &self.props {
            map.insert(keys::PROPS.into(), props.to_value());
        }
        if let Some(sandbox) = &self.sandbox {
            map.insert(
                keys::SANDBOX.into(),
                serde_json::to_value(sandbox).unwrap_or_default(),
            );
        }
        if let Some(nested) = self.nested {
            map.insert(
                keys::NESTED.into(),
                serde_json::to_value(nested).unwrap_or_default(),
            );
        }
        if self.custom_loader.is_some() {
            map.insert(keys::CUSTOM_LOADER.into(), function());
        }
        for name in self.hooks.keys() {
            map.insert(name.clone(), function());
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }

        Value::Object(map)
    }
}

/// Whether an extra under `key` would stand in for a typed field or a hook
fn shadows_slot(hooks: &HookSet, key: &str) -> bool {
    keys::is_field_key(key) || STANDARD_LIFECYCLE_KEYS.contains(&key) || hooks.contains_key(key)
}
