//! Generator configuration
//!
//! Options come from three layers, later layers winning: built-in defaults, the
//! optional `dts-bundle.toml` in the project root, and command-line flags (applied
//! by the CLI directly on [`GeneratorOptions`]).

use crate::emit::DEFAULT_TSC_COMMAND;
use crate::shake::ShakeStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project configuration file name
pub const CONFIG_FILE: &str = "dts-bundle.toml";

/// Default entry file, relative to the project root
pub const DEFAULT_ENTRY: &str = "index.ts";

/// Default output file, relative to the project root
pub const DEFAULT_OUTPUT: &str = "index.d.ts";

/// Errors that can occur while reading dts-bundle.toml
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse dts-bundle.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Contents of dts-bundle.toml. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BundleConfig {
    /// Entry file; an empty string means "no entry"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Parent directory for the temporary declaration directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmp: Option<String>,

    /// Shake strategy name, validated when a run starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shake: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// `false` disables the alias statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsc_command: Option<String>,

    /// Extra compiler arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tsc_args: Vec<String>,
}

impl BundleConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse config from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read `<root>/dts-bundle.toml`, or defaults if the file does not exist
    pub fn load_optional(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Everything one generation run needs
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    /// Project root containing package.json
    pub root: PathBuf,

    /// Parent of the temporary directory; system temp dir when `None`
    pub tmp: Option<PathBuf>,

    /// Entry file relative to the root
    pub entry: Option<PathBuf>,

    /// Output file relative to the root
    pub output: PathBuf,

    /// Shake strategy name; unknown names fall back to `off` with a warning
    pub shake: String,

    /// Alias template; `None` uses the default
    pub template: Option<String>,

    pub add_alias: bool,

    /// Best-effort mode: compiler and read failures become warnings
    pub force: bool,

    pub tsc_command: String,
    pub tsc_args: Vec<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tmp: None,
            entry: Some(PathBuf::from(DEFAULT_ENTRY)),
            output: PathBuf::from(DEFAULT_OUTPUT),
            shake: ShakeStrategy::Off.to_string(),
            template: None,
            add_alias: true,
            force: false,
            tsc_command: DEFAULT_TSC_COMMAND.to_string(),
            tsc_args: Vec::new(),
        }
    }
}

impl GeneratorOptions {
    /// Defaults for a project root
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Overlay values present in `config`
    pub fn apply_config(&mut self, config: &BundleConfig) {
        if let Some(entry) = &config.entry {
            self.entry = if entry.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(entry))
            };
        }
        if let Some(output) = &config.output {
            self.output = PathBuf::from(output);
        }
        if let Some(tmp) = &config.tmp {
            self.tmp = Some(PathBuf::from(tmp));
        }
        if let Some(shake) = &config.shake {
            self.shake = shake.clone();
        }
        if let Some(template) = &config.template {
            self.template = Some(template.clone());
        }
        if let Some(alias) = config.alias {
            self.add_alias = alias;
        }
        if let Some(force) = config.force {
            self.force = force;
        }
        if let Some(command) = &config.tsc_command {
            self.tsc_command = command.clone();
        }
        if !config.tsc_args.is_empty() {
            self.tsc_args = config.tsc_args.clone();
        }
    }

    /// Absolute path of the output file
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}
