// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Allow println! in main.rs for CLI user-facing output
#![allow(clippy::print_stdout)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::{Path, PathBuf};

use config_master::{load_config_file, Config};

#[derive(Parser)]
#[command(name = "config-master")]
#[command(about = "Resolve declarative configuration files against the environment")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file (YAML or JSON)
    #[arg(short, long, default_value = "config/app.yaml", global = true)]
    config: PathBuf,

    /// Load environment variables from this file instead of the `.env` next to the config
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration and report whether it is valid
    Validate {
        /// Print the resolved configuration when it is valid
        #[arg(long)]
        show_resolved: bool,
    },

    /// Print the resolved value at a flat or dotted key
    Get {
        /// Key to look up, e.g. "server.port"
        key: String,
    },

    /// Print the whole resolved configuration
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    load_env_file(&cli.config, cli.env_file.as_deref())?;

    match cli.command {
        Commands::Validate { show_resolved } => validate_config(&cli.config, show_resolved),
        Commands::Get { key } => get_value(&cli.config, &key),
        Commands::Show { format } => show_config(&cli.config, format),
    }
}

/// Load a `.env` file into the process environment before resolution.
///
/// An explicit `--env-file` must exist. Otherwise a `.env` in the config
/// file's directory is loaded if present.
fn load_env_file(config_path: &Path, explicit: Option<&Path>) -> Result<()> {
    if let Some(env_file) = explicit {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
        info!("Loaded environment variables from {}", env_file.display());
        return Ok(());
    }

    let Some(config_dir) = config_path.parent() else {
        return Ok(());
    };
    let env_file = if config_dir.as_os_str().is_empty() {
        PathBuf::from(".env")
    } else {
        config_dir.join(".env")
    };

    if env_file.exists() {
        dotenvy::from_path(&env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
        info!("Loaded environment variables from {}", env_file.display());
    } else {
        debug!("No .env file at {}", env_file.display());
    }
    Ok(())
}

/// Validate a configuration file
fn validate_config(config_path: &Path, show_resolved: bool) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    match load_config_file(config_path) {
        Ok(config) => {
            println!("[OK] Configuration is valid");
            println!("  Top-level keys: {}", config.as_map().len());

            if show_resolved {
                println!();
                println!("Resolved configuration:");
                print!("{}", serde_yaml::to_string(&config)?);
            }
            Ok(())
        }
        Err(e) if e.is_source_error() => {
            println!("[ERROR] Configuration could not be read:");
            println!("  {e}");
            std::process::exit(1);
        }
        Err(e) => {
            println!("[ERROR] Configuration is invalid:");
            println!("  {e}");
            std::process::exit(1);
        }
    }
}

fn get_value(config_path: &Path, key: &str) -> Result<()> {
    let config = resolve(config_path)?;

    match config.get(key) {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
        None => {
            println!("[ERROR] No value at '{key}'");
            std::process::exit(1);
        }
    }
}

fn show_config(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = resolve(config_path)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&config)?),
    }
    Ok(())
}

fn resolve(config_path: &Path) -> Result<Config> {
    load_config_file(config_path)
        .with_context(|| format!("Failed to resolve configuration {}", config_path.display()))
}
