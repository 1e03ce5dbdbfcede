//! mfe-options CLI
//!
//! Entry point for the `mfe-options` command-line tool.

use clap::{Parser, Subcommand};
use chrono::Utc;
use mfe_options::config::{ConfigSource, OptionsData};
use mfe_options::{Host, HostConfigFile, LoadOverride, Options};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "mfe.toml";

#[derive(Parser)]
#[command(name = "mfe-options")]
#[command(about = "Resolve effective micro-frontend application options", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the options one app would be loaded with
    Resolve {
        /// App name
        app: String,

        /// Path to host config file (default: mfe.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Load the app from this entry
        #[arg(long, conflicts_with = "override_json")]
        entry: Option<String>,

        /// Load-time override as a JSON object
        #[arg(long = "override")]
        override_json: Option<String>,

        /// Apply the nested scope guard with this slot id
        #[arg(long)]
        nested_id: Option<u64>,
    },

    /// Check a host config file and every app it declares
    Verify {
        /// Path to host config file (default: mfe.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            app,
            config,
            entry,
            override_json,
            nested_id,
        } => {
            run_resolve(&app, config, entry, override_json, nested_id);
        }
        Commands::Verify { config } => {
            run_verify(config);
        }
    }
}

fn run_resolve(
    app: &str,
    config_path: Option<PathBuf>,
    entry: Option<String>,
    override_json: Option<String>,
    nested_id: Option<u64>,
) {
    let (host, source) = match load_host(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let load = match (entry, override_json) {
        (Some(entry), _) => LoadOverride::Entry(entry),
        (None, Some(json)) => match parse_override(&json) {
            Ok(options) => LoadOverride::Options(options),
            Err(e) => {
                eprintln!("Invalid override: {}", e);
                process::exit(1);
            }
        },
        (None, None) => LoadOverride::None,
    };

    let mut resolved = match host.resolve(app, load) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Resolution failed: {}", e);
            process::exit(1);
        }
    };
    if let Some(id) = nested_id {
        resolved.guard_nested(&host, id);
    }

    let report = serde_json::json!({
        "createdAt": Utc::now(),
        "app": app,
        "configFile": source,
        "sources": resolved.sources(),
        "options": resolved.to_value(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_verify(config_path: Option<PathBuf>) {
    let (host, source) = match load_host(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    match source {
        Some(source) => println!("Configuration valid: {} (sha256 {})", source.path, source.digest),
        None => println!("No config file found, using built-in defaults"),
    }

    let mut failures = 0;
    for name in host.app_names() {
        match host.resolve(name, LoadOverride::None) {
            Ok(resolved) => println!("  {}: {}", name, resolved.entry()),
            Err(e) => {
                failures += 1;
                println!("  {}: {}", name, e);
            }
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn load_host(config_path: Option<PathBuf>) -> Result<(Host, Option<ConfigSource>), String> {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (global, source) = if path.exists() {
        let file = HostConfigFile::load(&path).map_err(|e| e.to_string())?;
        let source = file.source.clone();
        (file.into_options(), Some(source))
    } else {
        (Options::default(), None)
    };

    let host = Host::builder()
        .global_config(global)
        .build()
        .map_err(|e| e.to_string())?;
    Ok((host, source))
}

fn parse_override(json: &str) -> Result<Options, String> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    OptionsData::from_value(value)
        .map(Options::from)
        .map_err(|e| e.to_string())
}
