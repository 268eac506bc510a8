//! Configuration management
//!
//! Settings are layered: `~/.genmachine/config.toml`, then
//! `./genmachine.toml`, then environment variables. `GENMACHINE_CONFIG`
//! replaces the two files with a single explicit one. Command-line flags are
//! applied last, by the caller.

use std::path::{Path, PathBuf};

use genmachine::CompileOptions;
use serde::{Deserialize, Serialize};

use crate::env;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The `[compile]` table. Unset keys fall through to the previous layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileTable {
    pub class_suffix: Option<String>,
    pub state_field: Option<String>,
    pub counter_field: Option<String>,
    pub resume_param: Option<String>,
    pub invalid_step_message: Option<String>,
}

/// Global configuration for genmachinec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output directory
    pub out_dir: Option<String>,
    pub compile: CompileTable,
}

impl Config {
    /// Load every configuration layer and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        match env::get_config_path() {
            Some(path) => config.merge(Self::load_from_file(Path::new(&path))?),
            None => {
                for path in Self::search_paths() {
                    if path.exists() {
                        config.merge(Self::load_from_file(&path)?);
                    }
                }
            }
        }

        if let Some(dir) = env::get_out_dir() {
            config.out_dir = Some(dir);
        }
        if let Some(suffix) = env::get_class_suffix() {
            config.compile.class_suffix = Some(suffix);
        }
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// User-wide file first, project file second
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(mut home) = dirs::home_dir() {
            home.push(".genmachine");
            home.push("config.toml");
            paths.push(home);
        }
        paths.push(PathBuf::from("genmachine.toml"));
        paths
    }

    /// Overlay every key `other` sets
    pub fn merge(&mut self, other: Config) {
        fn overlay(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }
        overlay(&mut self.out_dir, other.out_dir);
        let compile = other.compile;
        overlay(&mut self.compile.class_suffix, compile.class_suffix);
        overlay(&mut self.compile.state_field, compile.state_field);
        overlay(&mut self.compile.counter_field, compile.counter_field);
        overlay(&mut self.compile.resume_param, compile.resume_param);
        overlay(&mut self.compile.invalid_step_message, compile.invalid_step_message);
    }

    /// Library options with every configured key applied over the defaults
    pub fn compile_options(&self) -> CompileOptions {
        let mut options = CompileOptions::default();
        let table = self.compile.clone();
        if let Some(v) = table.class_suffix {
            options.class_suffix = v;
        }
        if let Some(v) = table.state_field {
            options.state_field = v;
        }
        if let Some(v) = table.counter_field {
            options.counter_field = v;
        }
        if let Some(v) = table.resume_param {
            options.resume_param = v;
        }
        if let Some(v) = table.invalid_step_message {
            options.invalid_step_message = v;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_override_field_by_field() {
        let mut config = Config::parse(
            r#"
            out_dir = "gen"
            [compile]
            class_suffix = "Machine"
            state_field = "s"
            "#,
        )
        .unwrap();
        config.merge(Config::parse("[compile]\nclass_suffix = \"Fsm\"\n").unwrap());

        assert_eq!(config.out_dir.as_deref(), Some("gen"));
        let options = config.compile_options();
        assert_eq!(options.class_suffix, "Fsm");
        assert_eq!(options.state_field, "s");
        assert_eq!(options.counter_field, "nextStep");
    }

    #[test]
    fn unknown_compile_keys_are_rejected() {
        assert!(Config::parse("[compile]\nsufix = \"X\"\n").is_err());
    }
}
