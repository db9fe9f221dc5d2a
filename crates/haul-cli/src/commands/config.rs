//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use haul_core::HaulConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "export.delimiter")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&config_path),
        ConfigCommand::Init(init_args) => init_config(init_args, config_path),
        ConfigCommand::Get { key } => get_config(&config_path, &key),
        ConfigCommand::Set { key, value } => set_config(&config_path, &key, &value),
        ConfigCommand::Path => show_path(&config_path),
    }
}

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("haul")
        .join("config.json")
}

fn show_config(config_path: &Path) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        HaulConfig::from_file(config_path)?
    } else {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
        HaulConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, config_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = HaulConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    check_key(key, true)?;

    let config = if config_path.exists() {
        HaulConfig::from_file(config_path)?
    } else {
        HaulConfig::default()
    };

    let json = serde_json::to_value(&config)?;
    let value = json
        .pointer(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    check_key(key, false)?;

    let config = if config_path.exists() {
        HaulConfig::from_file(config_path)?
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        HaulConfig::default()
    };

    // Bare words are taken as strings
    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    let slot = json
        .pointer_mut(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = parsed_value.clone();

    let config: HaulConfig = serde_json::from_value(json)
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;
    config.save(config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

/// Dotted paths of every leaf setting, e.g. `export.delimiter`.
fn known_keys() -> anyhow::Result<Vec<String>> {
    let mut keys = Vec::new();
    collect_keys(&serde_json::to_value(HaulConfig::default())?, "", &mut keys);
    Ok(keys)
}

fn collect_keys(value: &Value, prefix: &str, keys: &mut Vec<String>) {
    match value.as_object() {
        Some(map) => {
            for (name, child) in map {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                collect_keys(child, &path, keys);
            }
        }
        None => keys.push(prefix.to_string()),
    }
}

/// Reject keys that name no setting. Sections are allowed only for reads.
fn check_key(key: &str, allow_section: bool) -> anyhow::Result<()> {
    let keys = known_keys()?;
    let section = format!("{}.", key);

    if keys.iter().any(|k| k == key) {
        return Ok(());
    }
    if keys.iter().any(|k| k.starts_with(&section)) {
        if allow_section {
            return Ok(());
        }
        anyhow::bail!("{} is a section; set one of its keys instead", key);
    }
    anyhow::bail!(
        "Unknown configuration key: {} (known keys: {})",
        key,
        keys.join(", ")
    )
}

fn pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'haul config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys() {
        let keys = known_keys().unwrap();
        assert!(keys.contains(&"export.delimiter".to_string()));
        assert!(keys.contains(&"ingest.accepted_content_types".to_string()));
        assert!(keys.contains(&"extraction.ticket_line_fallback".to_string()));
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("store.path", false).is_ok());
        assert!(check_key("export", true).is_ok());

        let err = check_key("export", false).unwrap_err();
        assert!(err.to_string().contains("is a section"));

        let err = check_key("foo.bar", false).unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key: foo.bar"));
        assert!(err.to_string().contains("export.date_format"));
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        set_config(&path, "export.delimiter", ";").unwrap();
        set_config(&path, "extraction.ticket_line_fallback", "false").unwrap();

        let config = HaulConfig::from_file(&path).unwrap();
        assert_eq!(config.export.delimiter, ';');
        assert!(!config.extraction.ticket_line_fallback);

        assert!(set_config(&path, "extraction.ticket_line_fallback", "maybe").is_err());
        assert!(set_config(&path, "foo.bar", "1").is_err());
        assert!(get_config(&path, "export").is_ok());
    }
}
