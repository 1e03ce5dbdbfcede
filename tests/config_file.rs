//! Host config file tests

use mfe_options::config::{DomGetter, FileFormat, HostConfigFile, Sandbox};
use mfe_options::{Host, LoadOverride};
use std::io::Write;
use tempfile::NamedTempFile;

const PORTAL_TOML: &str = r#"
appID = "portal"
basename = "/portal"
disableStatistics = true

[props]
tenant = "acme"

[[apps]]
name = "orders"
entry = "https://cdn.example.com/orders/index.html"
activeWhen = "/orders"
basename = "/portal/orders"

[[apps]]
name = "legacy"
sandbox = false
"#;

fn portal_host() -> Host {
    let mut temp = NamedTempFile::new().unwrap();
    write!(temp, "{}", PORTAL_TOML).unwrap();
    let file = HostConfigFile::load(temp.path()).unwrap();

    Host::builder()
        .global_config(file.into_options())
        .build()
        .unwrap()
}

#[test]
fn test_declared_apps_are_registered() {
    let host = portal_host();
    assert_eq!(host.app_names().collect::<Vec<_>>(), vec!["legacy", "orders"]);
}

#[test]
fn test_declared_app_resolves_with_file_globals() {
    let host = portal_host();
    let resolved = host.resolve("orders", LoadOverride::None).unwrap();

    assert_eq!(resolved.entry(), "https://cdn.example.com/orders/index.html");
    assert_eq!(resolved.basename.as_deref(), Some("/portal/orders"));
    let props = resolved.props.as_ref().unwrap();
    assert!(props.contains_key("tenant"));
    assert!(matches!(resolved.dom_getter, Some(DomGetter::Factory(_))));
    assert!(resolved.active_when.as_ref().unwrap().matches("/orders/42"));

    let value = resolved.to_value();
    assert!(value.get("appID").is_none());
    assert!(value.get("disableStatistics").is_none());
}

#[test]
fn test_declared_app_without_entry_needs_one_at_load() {
    let host = portal_host();

    assert!(host.resolve("legacy", LoadOverride::None).is_err());

    let resolved = host.resolve("legacy", "https://old.example.com/").unwrap();
    assert_eq!(resolved.sandbox, Some(Sandbox::Toggle(false)));
}

#[test]
fn test_global_only_settings_stay_on_host() {
    let host = portal_host();
    assert_eq!(host.global_config().app_id.as_deref(), Some("portal"));
    assert_eq!(host.global_config().disable_statistics, Some(true));
    assert_eq!(host.global_config().auto_refresh_app, Some(true));
}

#[test]
fn test_json_and_toml_agree() {
    let toml = HostConfigFile::parse(PORTAL_TOML, FileFormat::Toml).unwrap();
    let json = serde_json::to_string(&toml).unwrap();
    let reparsed = HostConfigFile::parse(&json, FileFormat::Json).unwrap();

    assert_eq!(reparsed.app_id, toml.app_id);
    assert_eq!(reparsed.apps.unwrap().len(), 2);
}
