//! Application configuration management.
//!
//! Settings are layered with `figment`, later sources winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file (`--config <PATH>`, or `config.toml` in the platform config directory)
//! 3. `MDTOHTML_*` environment variables (`__` separates nested keys,
//!    e.g. `MDTOHTML_EXTENSIONS__TABLES=false`)
//!
//! A configuration problem never blocks a conversion: [`Config::load`] logs
//! the failure and falls back to the defaults.
//!
//! # Example file
//!
//! ```toml
//! output = "document"
//! host = "worker"
//! verb_label = "Convert to &HTML"
//! stylesheet = "github-markdown.css"
//!
//! [extensions]
//! tables = true
//! smart_punctuation = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::convert::{Extensions, OutputFormat};
use crate::shell::DEFAULT_LABEL;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "MDTOHTML_";

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level keys understood by [`Config`].
const KNOWN_KEYS: &[&str] = &[
    "output",
    "extensions",
    "host",
    "verb_label",
    "stylesheet",
    "log_file",
];

/// How a `/Markdown` conversion is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    /// Convert in this process and show dialogs directly.
    #[default]
    Direct,
    /// Run a console worker and relay its prompts and errors as dialogs.
    Worker,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fragment or full document output.
    pub output: OutputFormat,
    /// Markdown extensions.
    pub extensions: Extensions,
    /// Conversion hosting mode.
    pub host: Host,
    /// Shortcut menu text.
    pub verb_label: String,
    /// Stylesheet linked from document output.
    pub stylesheet: Option<String>,
    /// Append log lines to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            extensions: Extensions::default(),
            host: Host::default(),
            verb_label: DEFAULT_LABEL.to_string(),
            stylesheet: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults on any error.
    ///
    /// `explicit` overrides the platform-specific file location.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                log::debug!("No configuration directory, using defaults");
                return Self::from_env().unwrap_or_default();
            }
        };

        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {:#}", e);
                Self::from_env().unwrap_or_default()
            }
        }
    }

    /// Load the configuration from a specific file, then apply environment
    /// overrides. A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            for warning in unknown_keys(&content) {
                log::warn!("{}: {}", path.display(), warning);
            }
        }

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Defaults plus environment overrides, without a file.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value has the wrong type.
    pub fn from_env() -> Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Invalid configuration in environment")
    }

    /// The platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mdtohtml", "mdtohtml")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

/// Warnings for top-level keys [`Config`] does not know, with a suggestion
/// for near misses. Content that is not valid TOML yields no warnings; the
/// loader reports it.
#[must_use]
pub fn unknown_keys(content: &str) -> Vec<String> {
    let Ok(table) = content.parse::<toml::Table>() else {
        return Vec::new();
    };

    table
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|key| {
            let closest = KNOWN_KEYS
                .iter()
                .map(|known| (strsim::jaro_winkler(key, known), *known))
                .filter(|(score, _)| *score > 0.8)
                .max_by(|a, b| a.0.total_cmp(&b.0));
            match closest {
                Some((_, known)) => format!("unknown key '{key}', did you mean '{known}'?"),
                None => format!("unknown key '{key}'"),
            }
        })
        .collect()
}
