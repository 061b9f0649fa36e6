//! Scrape Configuration
//!
//! Settings for the compiler invocation and the output policy, loaded from
//! an optional TOML file. Every field has a default, so a partial file (or
//! no file at all) is fine; command line flags are applied on top.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do when a shader fails to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompileFailurePolicy {
    /// Drop every binary and emit GLSL only
    #[default]
    Fallback,
    /// Fail the whole run
    Abort,
}

impl std::str::FromStr for CompileFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fallback" => Ok(CompileFailurePolicy::Fallback),
            "abort" => Ok(CompileFailurePolicy::Abort),
            other => Err(format!(
                "unknown compile failure policy '{}' (expected 'fallback' or 'abort')",
                other
            )),
        }
    }
}

/// External compiler section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler executable, looked up on PATH if not absolute
    #[serde(default = "default_compiler_path")]
    pub path: PathBuf,

    /// Language profile passed as -std=<std>
    #[serde(default = "default_std")]
    pub std: String,

    /// Wall-clock budget per compiler invocation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra arguments placed before the stage flag
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_compiler_path() -> PathBuf {
    PathBuf::from("glslc")
}

fn default_std() -> String {
    "430core".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            path: default_compiler_path(),
            std: default_std(),
            timeout_secs: default_timeout_secs(),
            extra_args: Vec::new(),
        }
    }
}

impl CompilerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Skip compilation and always emit GLSL only
    #[serde(default)]
    pub glsl_only: bool,

    /// Policy applied to the first compile failure
    #[serde(default)]
    pub on_compile_error: CompileFailurePolicy,

    /// Add `.stage = VK_SHADER_STAGE_*` to each generated create info
    #[serde(default)]
    pub emit_stage_field: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config = Self::parse(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Default configuration as commented TOML
    pub fn generate_default() -> Result<String, ConfigError> {
        let toml_content =
            toml::to_string_pretty(&Config::default()).map_err(ConfigError::SerializeError)?;

        Ok(format!(
            "# scrape configuration\n\
             #\n\
             # on_compile_error is \"fallback\" (emit GLSL only for every shader)\n\
             # or \"abort\" (fail the run on the first compile error).\n\
             \n\
             {toml_content}"
        ))
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, toml::de::Error),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
        }
    }
}
