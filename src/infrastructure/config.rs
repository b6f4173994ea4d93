// src/infrastructure/config.rs
use crate::domain::Currency;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML configuration for snapnote
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub print: PrintConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    /// JSON document store file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct MarketplaceConfig {
    /// Currency used when `publish` is given no `--currency`
    #[serde(default)]
    pub currency: Currency,
}

/// External command that turns a topic into note JSON on stdout.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PrintConfig {
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

// Default value functions
fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapnote")
        .join("store.json")
}
fn default_open_browser() -> bool { true }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            open_browser: default_open_browser(),
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/snapnote/snapnote.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snapnote").join("snapnote.toml"))
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load `path` if given, else the default location. A missing default file yields defaults;
    /// an explicitly requested file must exist.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load(default),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_toml_file_when_loading_then_reads_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("snapnote.toml");

        let toml_content = r#"
[store]
path = "/tmp/notes.json"

[marketplace]
currency = "LKR"

[generator]
command = "gen-note"
args = ["--model", "small"]

[print]
open_browser = false
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.store.path, PathBuf::from("/tmp/notes.json"));
        assert_eq!(config.marketplace.currency, Currency::Lkr);
        assert_eq!(config.generator.command, "gen-note");
        assert_eq!(config.generator.args, vec!["--model", "small"]);
        assert!(!config.print.open_browser);
    }

    #[test]
    fn given_partial_toml_when_loading_then_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[marketplace]\ncurrency = \"LKR\"\n").unwrap();

        let config = Config::load(&config_path).unwrap();

        // Specified value
        assert_eq!(config.marketplace.currency, Currency::Lkr);
        // Default values
        assert!(config.print.open_browser);
        assert!(config.generator.command.is_empty());
        assert!(config.store.path.ends_with("snapnote/store.json"));
    }

    #[test]
    fn given_unknown_currency_when_loading_then_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[marketplace]\ncurrency = \"EUR\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
    }

    #[test]
    fn given_explicit_missing_file_when_resolving_then_returns_error() {
        let result = Config::resolve(Some(Path::new("/nonexistent/path/snapnote.toml")));

        assert!(result.is_err());
    }

    #[test]
    fn given_round_trip_when_saving_and_loading_then_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("roundtrip.toml");

        let original = Config {
            store: StoreConfig {
                path: temp_dir.path().join("store.json"),
            },
            generator: GeneratorConfig {
                command: "gen-note".to_string(),
                args: vec!["--json".to_string()],
            },
            ..Default::default()
        };

        original.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded, original);
    }
}
