//! # Command Line Interface
//!
//! Operator tooling: CSO path validation and parsing, mount routing
//! inspection, engine health and configuration checks.

pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::cso::{CsoValidator, SecretPath};
use crate::observability::{init_observability, log_config_info};
use crate::secrets::BackendManager;

#[derive(Parser)]
#[command(name = "secretplane")]
#[command(about = "Common Secret Ontology path and mount routing tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate one or more secret paths against the CSO grammar
    Validate {
        /// Secret paths to check
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Parse a secret path and print its ring fields
    Parse {
        /// Secret path
        path: String,

        /// Output format (json or toml)
        #[arg(short, long, default_value = "json")]
        output: String,
    },

    /// Show which configured mount would serve a path
    Route {
        /// Secret path
        path: String,
    },

    /// Run health checks on every configured mount
    Health,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Output format (json or toml)
        #[arg(short, long, default_value = "toml")]
        output: String,
    },

    /// Load and validate the configuration, then build every mount
    Check,
}

#[derive(Debug, Serialize)]
struct RouteOutput {
    path: String,
    prefix: String,
    remainder: String,
    engine: String,
}

#[derive(Debug, Serialize)]
struct HealthOutput {
    prefix: String,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    if cli.json_logs {
        config.observability.json_logging = true;
    }
    init_observability(&config.observability).context("Failed to initialise observability")?;
    log_config_info(&config);

    match cli.command {
        Commands::Validate { paths } => handle_validate(&config, &paths)?,
        Commands::Parse { path, output } => handle_parse(&config, &path, &output)?,
        Commands::Route { path } => handle_route(&config, &path)?,
        Commands::Health => handle_health(&config).await?,
        Commands::Config { command } => handle_config_command(command, &config)?,
    }

    Ok(())
}

fn validator(config: &AppConfig) -> CsoValidator {
    CsoValidator::new(Arc::new(config.regions.table()))
}

fn handle_validate(config: &AppConfig, paths: &[String]) -> anyhow::Result<()> {
    let validator = validator(config);
    let mut failures = 0usize;

    for path in paths {
        match validator.validate(path) {
            Ok(()) => println!("✅ {}", path),
            Err(e) => {
                failures += 1;
                println!("❌ {}: {}", path, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} paths failed validation", failures, paths.len());
    }
    Ok(())
}

fn handle_parse(config: &AppConfig, path: &str, format: &str) -> anyhow::Result<()> {
    let parsed: SecretPath = validator(config).parse(path)?;
    output::print_output(&parsed, format)
}

fn handle_route(config: &AppConfig, path: &str) -> anyhow::Result<()> {
    let manager = BackendManager::from_config(config)?;
    let route = manager.route(path)?;

    output::print_json(&RouteOutput {
        path: route.path,
        prefix: route.prefix.to_string(),
        remainder: route.remainder,
        engine: route.engine.to_string(),
    })
}

async fn handle_health(config: &AppConfig) -> anyhow::Result<()> {
    let manager = BackendManager::from_config(config)?;
    let results = manager.health_check_all().await;

    let report: Vec<HealthOutput> = results
        .iter()
        .map(|(prefix, result)| HealthOutput {
            prefix: prefix.to_string(),
            healthy: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
        })
        .collect();
    output::print_json(&report)?;

    if report.iter().any(|entry| !entry.healthy) {
        anyhow::bail!("One or more secret engines are unhealthy");
    }
    Ok(())
}

fn handle_config_command(command: ConfigCommands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show { output } => output::print_output(config, &output)?,
        ConfigCommands::Check => {
            let manager = BackendManager::from_config(config)?;
            println!(
                "✅ Configuration is valid ({} mounts, CSO enforcement on write: {})",
                manager.registry().len(),
                config.router.enforce_cso_on_write
            );
        }
    }
    Ok(())
}
