// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use spycats_core::domain::service_config::{BreedProviderKind, ServiceConfigManifest, StorageBackendKind};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML (secrets redacted)
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./spycats-config.yaml)
        #[arg(short, long, default_value = "./spycats-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let mut config = ServiceConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. SPYCATS_CONFIG_PATH: {}",
            std::env::var("SPYCATS_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./spycats-config.yaml");
        println!("  4. ~/.spycats/config.yaml");
        println!("  5. /etc/spycats/config.yaml");
        println!();
    }

    redact_secrets(&mut config);

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Service:".bold());
    println!("  Name: {}", config.metadata.name);
    println!("  Listen: {}", config.bind_addr());
    println!();

    println!("{}", "Storage:".bold());
    match config.spec.storage.backend {
        StorageBackendKind::InMemory => println!("  Backend: in-memory"),
        StorageBackendKind::Postgres => {
            println!("  Backend: postgres");
            println!(
                "  Connection: {}",
                config
                    .spec
                    .storage
                    .postgres
                    .connection_string
                    .as_deref()
                    .unwrap_or("(not set)")
            );
            println!("  Max connections: {}", config.spec.storage.postgres.max_connections);
        }
    }
    println!();

    println!("{}", "Breed Registry:".bold());
    match config.spec.breeds.provider {
        BreedProviderKind::TheCatApi => {
            println!("  Provider: TheCatAPI");
            println!("  Endpoint: {}", config.spec.breeds.endpoint);
            println!(
                "  API key: {}",
                config.spec.breeds.api_key.as_deref().unwrap_or("(none)")
            );
            println!("  Timeout: {}s", config.spec.breeds.timeout_secs);
        }
        BreedProviderKind::Static => {
            println!("  Provider: static");
            for breed in &config.spec.breeds.allowed {
                println!("    - {}", breed);
            }
        }
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ServiceConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

/// Hide the database password and a literal API key
fn redact_secrets(config: &mut ServiceConfigManifest) {
    if let Some(conn) = config.spec.storage.postgres.connection_string.as_mut() {
        *conn = redact_connection_string(conn);
    }
    if let Some(key) = config.spec.breeds.api_key.as_mut() {
        if !key.starts_with("env:") {
            *key = "********".to_string();
        }
    }
}

fn redact_connection_string(conn: &str) -> String {
    let Some((scheme, rest)) = conn.split_once("://") else {
        return conn.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return conn.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:********@{}", scheme, user, host),
        None => conn.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_connection_string() {
        assert_eq!(
            redact_connection_string("postgres://agency:s3cret@db:5432/spycats"),
            "postgres://agency:********@db:5432/spycats"
        );
        assert_eq!(
            redact_connection_string("postgres://agency@db/spycats"),
            "postgres://agency@db/spycats"
        );
        assert_eq!(redact_connection_string("not a url"), "not a url");
    }

    #[test]
    fn test_templates_are_valid() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let config = ServiceConfigManifest::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("spycats-config.yaml");

        generate(output.clone(), true).await.unwrap();

        let config = ServiceConfigManifest::from_yaml_file(&output).unwrap();
        assert_eq!(config.spec.storage.backend, StorageBackendKind::Postgres);
        assert_eq!(config.spec.breeds.allowed.len(), 5);
    }
}
