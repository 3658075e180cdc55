use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for nbx configuration and data directories.
    //!
    //! NBX_HOME resolution order:
    //! 1. NBX_HOME environment variable (if set)
    //! 2. ~/.config/nbx (default)

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the nbx home directory.
    pub fn nbx_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("NBX_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("nbx"))
            .context("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(nbx_home()?.join("config.toml"))
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(nbx_home()?.join("logs"))
    }
}

/// Typing animation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Delay between revealed characters.
    pub typing_speed_ms: u64,
    pub initial_delay_ms: u64,
    /// Pause between full reveal and output.
    pub settle_delay_ms: u64,
    /// Extra start delay per cell in a batch.
    pub stagger_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            typing_speed_ms: 15,
            initial_delay_ms: 200,
            settle_delay_ms: 300,
            stagger_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// Heading of the welcome cell.
    pub title: String,
    /// Dataset graph to browse instead of the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets_file: Option<PathBuf>,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            title: Config::DEFAULT_TITLE.to_string(),
            datasets_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `nbx_tui=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub animation: AnimationConfig,
    pub notebook: NotebookConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_TITLE: &str = "Welcome to Data Explorer";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// The embedded template provides structure and comments; values come
    /// from `Config::default()`. Used by `xtask update-default-config`.
    pub fn generate() -> Result<String> {
        use toml_edit::{DocumentMut, Item, Table};

        fn merge(target: &mut Table, source: &Table) {
            for (key, value) in source {
                match value {
                    Item::Table(src_table) => {
                        if let Some(Item::Table(target_table)) = target.get_mut(key) {
                            merge(target_table, src_table);
                        } else {
                            target[key] = Item::Table(src_table.clone());
                        }
                    }
                    Item::None => {}
                    other => {
                        target[key] = other.clone();
                    }
                }
            }
        }

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge(doc.as_table_mut(), generated.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.animation.typing_speed_ms, 15);
        assert_eq!(config.notebook.title, "Welcome to Data Explorer");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[animation]\ntyping_speed_ms = 5\n\n[notebook]\ndatasets_file = \"data.json\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();

        assert_eq!(config.animation.typing_speed_ms, 5);
        assert_eq!(config.animation.settle_delay_ms, 300);
        assert!(config.animation.enabled);
        assert_eq!(
            config.notebook.datasets_file.as_deref(),
            Some(Path::new("data.json"))
        );
        assert_eq!(config.log.level, None);
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[animation\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("typing_speed_ms = 15"));
        assert!(contents.contains("# datasets_file ="));
        assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_generate_keeps_comments_and_defaults() {
        let generated = Config::generate().unwrap();

        assert!(generated.contains("# Delay between revealed characters."));
        assert!(generated.contains("stagger_ms = 200"));
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
