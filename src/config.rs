//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`PARLEY_API_KEY`, `PARLEY_BASE_URL`,
//!    `PARLEY_MODEL`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./parley.toml in the current directory
//! 4. $XDG_CONFIG_HOME/parley/parley.toml (or ~/.config/parley/parley.toml)
//! 5. Built-in defaults

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";
const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TURNS: usize = 8;

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub orchestrator: OrchestratorConfig,
    pub network: NetworkConfig,
    pub display: DisplayConfig,
}

/// Resolved API connection settings used by the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token; empty for endpoints that need no auth.
    pub api_key: String,
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            api_key: String::new(),
            model: DEFAULT_MODEL_ID.into(),
        }
    }
}

/// Orchestration loop behavior settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub system_prompt: String,
    /// Safety cap on completion requests per user turn; bounds runaway
    /// function-call loops.
    pub max_turns: usize,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_turns: DEFAULT_MAX_TURNS,
            temperature: None,
            top_p: None,
        }
    }
}

/// Network/HTTP timeout policy.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for completion API requests.
    pub api_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Display / rendering preferences.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub color: bool,
    /// Echo function calls and their results as they happen.
    pub show_function_calls: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_function_calls: true,
        }
    }
}

// ---------------------------------------------------------------------------
// File representation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api: FileApiConfig,
    orchestrator: FileOrchestratorConfig,
    network: FileNetworkConfig,
    display: FileDisplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileApiConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileOrchestratorConfig {
    system_prompt: Option<String>,
    max_turns: Option<usize>,
    temperature: Option<f64>,
    top_p: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileNetworkConfig {
    api_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileDisplayConfig {
    color: Option<bool>,
    show_function_calls: Option<bool>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration, optionally from an explicit file path.
///
/// An explicit path that does not exist is an error; the default lookup
/// locations are skipped silently when absent.
pub fn load_config(explicit_path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(path) = explicit_path {
        let path = Path::new(path);
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        apply_file(&mut config, &read_file_config(path)?);
    } else if let Some(path) = default_config_path() {
        apply_file(&mut config, &read_file_config(&path)?);
    }

    apply_env(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// First existing default config location, if any.
fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("parley.toml");
    if local.exists() {
        return Some(local);
    }
    let global = dirs::config_dir()?.join("parley").join("parley.toml");
    global.exists().then_some(global)
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

fn apply_file(config: &mut Config, file: &FileConfig) {
    if let Some(value) = &file.api.base_url {
        config.api.base_url = value.clone();
    }
    if let Some(value) = &file.api.api_key {
        config.api.api_key = value.clone();
    }
    if let Some(value) = &file.api.model {
        config.api.model = value.clone();
    }
    if let Some(value) = &file.orchestrator.system_prompt {
        config.orchestrator.system_prompt = value.clone();
    }
    if let Some(value) = file.orchestrator.max_turns {
        config.orchestrator.max_turns = value;
    }
    if let Some(value) = file.orchestrator.temperature {
        config.orchestrator.temperature = Some(value);
    }
    if let Some(value) = file.orchestrator.top_p {
        config.orchestrator.top_p = Some(value);
    }
    if let Some(value) = file.network.api_timeout_secs {
        config.network.api_timeout_secs = value;
    }
    if let Some(value) = file.display.color {
        config.display.color = value;
    }
    if let Some(value) = file.display.show_function_calls {
        config.display.show_function_calls = value;
    }
}

/// Overlay environment variables through an injectable lookup.
fn apply_env(config: &mut Config, get: impl Fn(&str) -> Option<String>) {
    if let Some(value) = non_empty(get("PARLEY_API_KEY")) {
        config.api.api_key = value;
    }
    if let Some(value) = non_empty(get("PARLEY_BASE_URL")) {
        config.api.base_url = value;
    }
    if let Some(value) = non_empty(get("PARLEY_MODEL")) {
        config.api.model = value;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.max_turns == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.max_turns must be at least 1".into(),
        ));
    }
    if config.api.model.trim().is_empty() {
        return Err(ConfigError::Invalid("api.model must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.model, DEFAULT_MODEL_ID);
        assert_eq!(config.orchestrator.max_turns, DEFAULT_MAX_TURNS);
        assert!(config.display.color);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:11434/v1"
            model = "llama3"

            [orchestrator]
            system_prompt = "You are a helpful weather assistant."
            max_turns = 3

            [display]
            show_function_calls = false
            "#,
        )
        .unwrap();
        let mut config = Config::default();
        apply_file(&mut config, &file);
        assert_eq!(config.api.base_url, "http://localhost:11434/v1");
        assert_eq!(config.api.model, "llama3");
        assert_eq!(
            config.orchestrator.system_prompt,
            "You are a helpful weather assistant."
        );
        assert_eq!(config.orchestrator.max_turns, 3);
        assert!(!config.display.show_function_calls);
        // untouched sections keep defaults
        assert_eq!(config.network.api_timeout_secs, DEFAULT_API_TIMEOUT_SECS);
    }

    #[test]
    fn env_overrides_file_values() {
        let file: FileConfig = toml::from_str(
            r#"
            [api]
            api_key = "file-key"
            model = "file-model"
            "#,
        )
        .unwrap();
        let mut config = Config::default();
        apply_file(&mut config, &file);
        apply_env(&mut config, |key| match key {
            "PARLEY_API_KEY" => Some("env-key".to_string()),
            "PARLEY_MODEL" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.api_key, "env-key");
        // blank env values do not clobber configured ones
        assert_eq!(config.api.model, "file-model");
    }

    #[test]
    fn zero_turn_cap_is_invalid() {
        let mut config = Config::default();
        config.orchestrator.max_turns = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unparseable_toml_is_an_error() {
        let result: Result<FileConfig, _> = toml::from_str("api = [unclosed");
        assert!(result.is_err());
    }
}
