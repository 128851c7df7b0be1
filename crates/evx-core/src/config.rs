//! Configuration management for evx.
//!
//! Loads configuration from ${EVX_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Order in which stack trace frames are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StacktraceOrder {
    /// Innermost frame at the top (default)
    #[default]
    NewestFirst,
    OldestFirst,
}

impl StacktraceOrder {
    pub fn from_newest_first(newest_first: bool) -> Self {
        if newest_first {
            StacktraceOrder::NewestFirst
        } else {
            StacktraceOrder::OldestFirst
        }
    }

    pub fn is_newest_first(self) -> bool {
        self == StacktraceOrder::NewestFirst
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StacktraceOrder::NewestFirst => "newest_first",
            StacktraceOrder::OldestFirst => "oldest_first",
        }
    }
}

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time. Regenerate it with
/// `cargo xtask update-default-config` after changing defaults.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Overlays user values onto the template so new sections and comments
/// appear while customized values survive.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively copies values from `source` into `target`.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for evx configuration.
    //!
    //! EVX_HOME resolution order:
    //! 1. EVX_HOME environment variable (if set)
    //! 2. ~/.config/evx (default)

    use std::path::PathBuf;

    /// Returns the evx home directory.
    pub fn evx_home() -> PathBuf {
        if let Ok(home) = std::env::var("EVX_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".evx"),
            |h| h.join(".config").join("evx"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        evx_home().join("config.toml")
    }
}

/// Connection settings for the monitoring service API.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL (overridden by EVX_BASE_URL)
    pub base_url: Option<String>,
    /// Bearer token (falls back to EVX_AUTH_TOKEN)
    pub auth_token: Option<String>,
    /// Default organization slug
    pub organization: Option<String>,
}

impl ApiSettings {
    /// Returns the configured base URL, treating blank values as unset.
    pub fn effective_base_url(&self) -> Option<&str> {
        non_blank(self.base_url.as_deref())
    }

    pub fn effective_organization(&self) -> Option<&str> {
        non_blank(self.organization.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub stacktrace_order: StacktraceOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// EnvFilter directive, e.g. "info" or "evx_core=debug"
    pub level: String,
    /// Optional log file; stderr when unset
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Config::DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub display: DisplayConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
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

    /// Saves only `display.stacktrace_order` to the default config file.
    pub fn save_stacktrace_order(order: StacktraceOrder) -> Result<()> {
        Self::save_stacktrace_order_to(&paths::config_path(), order)
    }

    /// Saves only `display.stacktrace_order` to a specific config file.
    ///
    /// Creates the file from the template if it doesn't exist; otherwise
    /// merges the user's values into the latest template first.
    pub fn save_stacktrace_order_to(path: &Path, order: StacktraceOrder) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["display"]["stacktrace_order"] = value(order.as_str());

        Self::write_config(path, &doc.to_string())
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
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`. The embedded template provides the
    /// structure and comments.
    pub fn generate() -> Result<String> {
        let generated =
            toml::to_string(&Config::default()).context("Failed to serialize default config")?;

        let mut doc: toml_edit::DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: toml_edit::DocumentMut = generated
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content atomically (temp file + rename), creating
    /// parent directories as needed.
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
        })?;

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.log.level, "warn");
        assert!(config.display.stacktrace_order.is_newest_first());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[api]\norganization = \"acme\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.effective_organization(), Some("acme"));
        assert_eq!(config.api.effective_base_url(), None);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_load_rejects_unknown_order() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[display]\nstacktrace_order = \"sideways\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_blank_api_values_are_unset() {
        let settings = ApiSettings {
            base_url: Some("   ".to_string()),
            organization: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.effective_base_url(), None);
        assert_eq!(settings.effective_organization(), None);
    }

    #[test]
    fn test_init_creates_config_from_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# evx configuration"));
        assert!(contents.contains("# base_url = \"https://sentry.io\""));
        assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_save_stacktrace_order_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        Config::save_stacktrace_order_to(&config_path, StacktraceOrder::OldestFirst).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(
            config.display.stacktrace_order,
            StacktraceOrder::OldestFirst
        );
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Order of stack trace frames"));
    }

    #[test]
    fn test_save_stacktrace_order_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"[api]
organization = "acme"

[log]
level = "debug"
"#,
        )
        .unwrap();

        Config::save_stacktrace_order_to(&config_path, StacktraceOrder::OldestFirst).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.organization.as_deref(), Some("acme"));
        assert_eq!(config.log.level, "debug");
        assert!(!config.display.stacktrace_order.is_newest_first());
        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_generate_matches_defaults() {
        let generated = Config::generate().unwrap();
        let config: Config = toml::from_str(&generated).unwrap();
        assert_eq!(config, Config::default());
        assert!(generated.contains("stacktrace_order = \"newest_first\""));
    }
}
