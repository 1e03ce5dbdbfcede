//! mfe-options - effective options for micro-frontend hosts
//!
//! This crate resolves the options a host hands to its loader for each
//! sub-application: global defaults, registration records and load-time
//! overrides are merged under an attribute allow-list, and the lifecycle hooks
//! of nested contexts are wrapped so they learn which nesting slot they run in.

pub mod config;
pub mod hooks;
pub mod host;
pub mod logger;
pub mod resolver;

pub use config::{ConfigError, HostConfigFile, Options};
pub use hooks::{Hook, HookContext, HookReturn, LifecycleKeys};
pub use host::{Host, HostBuilder};
pub use logger::{Logger, TracingLogger};
pub use resolver::{resolve, ConfigOrigin, LoadOverride, ResolvedOptions};
