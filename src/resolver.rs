//! Options resolution
//!
//! Resolves the options for one application load from three sources, highest
//! precedence first:
//! 1. The load-time override (a bare entry URL or partial options)
//! 2. The app's registration record
//! 3. The host's global options

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, NestedId, Options};
use crate::hooks;
use crate::host::Host;

/// What the caller passed when loading an app
#[derive(Debug, Clone, Default)]
pub enum LoadOverride {
    /// Nothing; same as empty options
    #[default]
    None,
    /// Bare entry location
    Entry(String),
    Options(Options),
}

impl From<&str> for LoadOverride {
    fn from(entry: &str) -> Self {
        LoadOverride::Entry(entry.to_string())
    }
}

impl From<String> for LoadOverride {
    fn from(entry: String) -> Self {
        LoadOverride::Entry(entry)
    }
}

impl From<Options> for LoadOverride {
    fn from(options: Options) -> Self {
        LoadOverride::Options(options)
    }
}

impl From<Option<Options>> for LoadOverride {
    fn from(options: Option<Options>) -> Self {
        options.map_or(LoadOverride::None, LoadOverride::Options)
    }
}

/// A source that contributed to a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Global,
    Registration,
    Override,
}

/// Options for one app load.
///
/// `name` always equals the requested app name and `entry` is never empty.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    options: Options,
    sources: Vec<ConfigOrigin>,
}

impl ResolvedOptions {
    pub fn name(&self) -> &str {
        self.options.name.as_deref().unwrap_or_default()
    }

    pub fn entry(&self) -> &str {
        self.options.entry.as_deref().unwrap_or_default()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn into_options(self) -> Options {
        self.options
    }

    /// Contributing sources, lowest precedence first
    pub fn sources(&self) -> &[ConfigOrigin] {
        &self.sources
    }

    /// Apply the nested scope guard to these options
    pub fn guard_nested(&mut self, host: &Host, nested_id: NestedId) -> &mut Self {
        hooks::guard(host, &mut self.options, nested_id);
        self
    }
}

impl Deref for ResolvedOptions {
    type Target = Options;

    fn deref(&self) -> &Options {
        &self.options
    }
}

/// Resolve the options for loading `app_name` on `host`.
///
/// Fails with [`ConfigError::MissingEntry`] when no source supplies an entry.
/// The registry is only read.
pub fn resolve(
    app_name: &str,
    host: &Host,
    load: impl Into<LoadOverride>,
) -> Result<ResolvedOptions, ConfigError> {
    let registered = host.app(app_name);
    let empty = Options::default();

    let mut sources = vec![ConfigOrigin::Global];
    if registered.is_some() {
        sources.push(ConfigOrigin::Registration);
    }

    let candidate = match load.into() {
        LoadOverride::Entry(entry) => {
            sources.push(ConfigOrigin::Override);
            match registered {
                Some(app) => Options {
                    entry: Some(entry),
                    ..app.clone()
                },
                None => Options::new()
                    .with_name(app_name)
                    .with_basename("/")
                    .with_entry(entry),
            }
        }
        LoadOverride::Options(overrides) => {
            sources.push(ConfigOrigin::Override);
            host.allowlist()
                .resolve_allowed(registered.unwrap_or(&empty), &overrides)
        }
        LoadOverride::None => host
            .allowlist()
            .resolve_allowed(registered.unwrap_or(&empty), &empty),
    };

    let mut resolved = host
        .allowlist()
        .resolve_allowed(host.global_config(), &candidate);

    match resolved.entry.as_deref() {
        Some(entry) if !entry.is_empty() => {}
        _ => {
            return Err(ConfigError::MissingEntry {
                app: app_name.to_string(),
            })
        }
    }
    resolved.name = Some(app_name.to_string());

    Ok(ResolvedOptions {
        options: resolved,
        sources,
    })
}
