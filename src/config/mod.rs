//! Configuration records and merging
//!
//! Three sources feed an application's options, lowest precedence first:
//! 1. Global host options (built-in defaults, optionally a host config file)
//! 2. The app's registration record
//! 3. The override passed when loading the app

mod allowlist;
mod defaults;
mod error;
mod file;
mod merge;
mod options;

pub use allowlist::{AttributeAllowlist, FIXED_ATTRIBUTES};
pub use defaults::create_default_options;
pub use error::ConfigError;
pub use file::{ConfigSource, FileFormat, HostConfigFile, OptionsData};
pub use merge::{deep_merge, merge_maps, merge_options, merge_props, merge_sandbox};
pub use options::{
    keys, ActiveWhen, ContainerElement, CustomLoader, DomGetter, Nested, NestedId, Options,
    PropValue, Props, Sandbox, SandboxConfig, FUNCTION_PLACEHOLDER, SHARED_PLACEHOLDER,
};
