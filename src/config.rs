//! Compiler configuration — loads optional `uix.yaml` or ~/.uix/config.yaml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dsl::parser::Strictness;
use crate::error::Error;

/// Name of the project-local config file.
pub const LOCAL_CONFIG: &str = "uix.yaml";

/// Compiler settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Reject unknown keywords instead of passing them through as raw nodes.
    pub strict: bool,
    /// Validate table references and uniqueness before emitting anything.
    pub check_tables: bool,
    /// Value written by a bare `update TABLE` statement.
    pub update_placeholder: String,
    /// Where the CLI writes the artifact.
    pub output: PathBuf,
    pub store: StoreConfig,
    pub style: StyleConfig,
}

/// Location of the embedded relational store runtime.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub script_url: String,
    /// Prefix used to locate the store's wasm binary.
    pub wasm_base: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font_family: String,
    pub padding_px: u32,
    pub gap_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            check_tables: true,
            update_placeholder: "new text".to_string(),
            output: PathBuf::from("dist").join("index.html"),
            store: StoreConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            script_url: "https://sql.js.org/dist/sql-wasm.js".to_string(),
            wasm_base: "https://sql.js.org/dist/".to_string(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            padding_px: 20,
            gap_px: 10,
        }
    }
}

impl Config {
    pub fn strictness(&self) -> Strictness {
        if self.strict {
            Strictness::Strict
        } else {
            Strictness::Permissive
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Get the user-wide config file path.
fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".uix").join("config.yaml"))
}

/// Resolve the configuration.
///
/// An explicit path must load. Otherwise `uix.yaml` in `dir` is tried, then
/// ~/.uix/config.yaml, then the defaults. A file that exists but does not
/// parse is an error rather than being silently ignored.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config, Error> {
    if let Some(path) = explicit {
        return Config::from_path(path);
    }

    let candidates = std::iter::once(dir.join(LOCAL_CONFIG)).chain(user_config_path());
    for path in candidates {
        if path.is_file() {
            return Config::from_path(&path);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_checks_tables() {
        let config = Config::default();
        assert!(!config.strict);
        assert!(config.check_tables);
        assert_eq!(config.update_placeholder, "new text");
        assert_eq!(config.output, PathBuf::from("dist/index.html"));
        assert_eq!(config.strictness(), Strictness::Permissive);
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
strict: true
check_tables: false
update_placeholder: edited
output: public/app.html
store:
  script_url: /vendor/sql-wasm.js
  wasm_base: /vendor/
style:
  font_family: Georgia, serif
  gap_px: 4
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.strict);
        assert!(!config.check_tables);
        assert_eq!(config.update_placeholder, "edited");
        assert_eq!(config.output, PathBuf::from("public/app.html"));
        assert_eq!(config.store.wasm_base, "/vendor/");
        assert_eq!(config.style.font_family, "Georgia, serif");
        assert_eq!(config.style.gap_px, 4);
        assert_eq!(config.style.padding_px, 20);
        assert_eq!(config.strictness(), Strictness::Strict);
    }

    #[test]
    fn partial_yaml_config() {
        let config = Config::from_yaml("strict: true\n").unwrap();
        assert!(config.strict);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            Config::from_yaml("strict: [1, 2"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn local_config_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCAL_CONFIG), "update_placeholder: local\n").unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.update_placeholder, "local");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            load_config(Some(missing.as_path()), dir.path()),
            Err(Error::Io(_))
        ));
    }
}
