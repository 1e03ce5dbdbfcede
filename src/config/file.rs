//! Host configuration files
//!
//! A host config file carries the global options and the static app
//! declarations. TOML and JSON are accepted. The SHA-256 digest of the raw
//! bytes is kept so a resolution report can name the exact file it came from.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::error::ConfigError;
use super::options::{ActiveWhen, DomGetter, Nested, Options, Props, Sandbox};

/// Where a loaded config came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// File format of a host config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// `.json` files are JSON, everything else is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

/// Data-only options as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsData {
    #[serde(default, rename = "appID", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<OptionsData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_refresh_app: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_statistics: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_preload_app: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Path prefix the app is active under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_when: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,

    /// Container selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_getter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<Sandbox>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Nested>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_check_provider: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptionsData {
    /// Parse options from a JSON value (e.g. a `--override` argument)
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl From<OptionsData> for Options {
    fn from(data: OptionsData) -> Self {
        // customLoader cannot come from a file; it is dropped with the other
        // extras that collide with typed keys
        let mut options = Options {
            app_id: data.app_id,
            apps: data
                .apps
                .map(|apps| apps.into_iter().map(Options::from).collect()),
            auto_refresh_app: data.auto_refresh_app,
            disable_statistics: data.disable_statistics,
            disable_preload_app: data.disable_preload_app,
            name: data.name,
            entry: data.entry,
            active_when: data.active_when.map(ActiveWhen::Path),
            basename: data.basename,
            dom_getter: data.dom_getter.map(DomGetter::Selector),
            props: data.props.map(Props::from),
            sandbox: data.sandbox,
            cache: data.cache,
            nested: data.nested,
            no_check_provider: data.no_check_provider,
            custom_loader: None,
            hooks: Default::default(),
            extra: data.extra,
        };
        options.drop_shadowed_extras();
        options
    }
}

/// A parsed host config file
#[derive(Debug, Clone)]
pub struct HostConfigFile {
    pub source: ConfigSource,
    pub options: OptionsData,
}

impl HostConfigFile {
    /// Load and parse a config file, recording its digest
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
        let options = Self::parse(&contents, FileFormat::from_path(path))?;

        Ok(Self {
            source: ConfigSource {
                path: path.to_string_lossy().to_string(),
                digest,
            },
            options,
        })
    }

    /// Parse config contents in the given format
    pub fn parse(contents: &str, format: FileFormat) -> Result<OptionsData, ConfigError> {
        let value = match format {
            FileFormat::Toml => {
                let toml_value: toml::Value = toml::from_str(contents)
                    .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
                toml_to_json(toml_value)
            }
            FileFormat::Json => serde_json::from_str(contents)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
        };
        OptionsData::from_value(value)
    }

    pub fn into_options(self) -> Options {
        Options::from(self.options)
    }
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            Value::Object(table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}
