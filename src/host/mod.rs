//! Host
//!
//! The host owns everything resolution reads: the global options, the
//! registry of known applications, the recognized lifecycle hook names and
//! the allow-list derived from them, and the logger.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{
    create_default_options, merge_options, AttributeAllowlist, ConfigError, Options,
};
use crate::hooks::LifecycleKeys;
use crate::logger::{Logger, TracingLogger};
use crate::resolver::{self, LoadOverride, ResolvedOptions};

/// A micro-frontend host
pub struct Host {
    global_config: Options,
    registry: BTreeMap<String, Options>,
    lifecycle_keys: LifecycleKeys,
    allowlist: AttributeAllowlist,
    logger: Arc<dyn Logger>,
}

impl Host {
    /// Host with built-in defaults, no registered apps and a tracing logger
    pub fn new(lifecycle_keys: LifecycleKeys) -> Self {
        Self::assemble(lifecycle_keys, false, Arc::new(TracingLogger))
    }

    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    fn assemble(lifecycle_keys: LifecycleKeys, nested: bool, logger: Arc<dyn Logger>) -> Self {
        let allowlist = AttributeAllowlist::new(&lifecycle_keys);
        let global_config = create_default_options(nested, Arc::clone(&logger));
        Self {
            global_config,
            registry: BTreeMap::new(),
            lifecycle_keys,
            allowlist,
            logger,
        }
    }

    pub fn global_config(&self) -> &Options {
        &self.global_config
    }

    pub fn lifecycle_keys(&self) -> &LifecycleKeys {
        &self.lifecycle_keys
    }

    pub fn allowlist(&self) -> &AttributeAllowlist {
        &self.allowlist
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Registration record for `name`
    pub fn app(&self, name: &str) -> Option<&Options> {
        self.registry.get(name)
    }

    /// Registered app names, sorted
    pub fn app_names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Register an app, replacing any previous record with the same name
    pub fn register(&mut self, app: Options) -> Result<(), ConfigError> {
        let name = match app.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(ConfigError::InvalidRegistration(
                    "app declaration is missing a name".to_string(),
                ))
            }
        };
        self.registry.insert(name, app);
        Ok(())
    }

    /// Resolve the options for loading `app_name`
    pub fn resolve(
        &self,
        app_name: &str,
        load: impl Into<LoadOverride>,
    ) -> Result<ResolvedOptions, ConfigError> {
        resolver::resolve(app_name, self, load)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("global_config", &self.global_config)
            .field("registry", &self.registry)
            .field("lifecycle_keys", &self.lifecycle_keys)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Host`]
#[derive(Default)]
pub struct HostBuilder {
    lifecycle_keys: Option<LifecycleKeys>,
    nested: bool,
    logger: Option<Arc<dyn Logger>>,
    global_config: Options,
    apps: Vec<Options>,
}

impl HostBuilder {
    /// Hook names the host recognizes (default: the standard set)
    pub fn lifecycle_keys(mut self, keys: LifecycleKeys) -> Self {
        self.lifecycle_keys = Some(keys);
        self
    }

    /// Use the nested-context defaults
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Options merged over the built-in defaults
    pub fn global_config(mut self, options: Options) -> Self {
        self.global_config = options;
        self
    }

    /// Register an app in addition to those declared in the global `apps`
    pub fn register(mut self, app: Options) -> Self {
        self.apps.push(app);
        self
    }

    /// Build the host, registering declared apps first, then explicit ones
    pub fn build(self) -> Result<Host, ConfigError> {
        let logger = self.logger.unwrap_or_else(|| Arc::new(TracingLogger));
        let lifecycle_keys = self.lifecycle_keys.unwrap_or_default();
        let mut host = Host::assemble(lifecycle_keys, self.nested, logger);
        host.global_config = merge_options(&host.global_config, &self.global_config);

        let declared = host.global_config.apps.clone().unwrap_or_default();
        for app in declared.into_iter().chain(self.apps) {
            host.register(app)?;
        }
        Ok(host)
    }
}
