//! Configuration management for the KnowThyself gateway.
//!
//! Loads configuration from ${KNOWTHYSELF_HOME}/config.toml with sensible
//! defaults; environment variables override file values at resolution time.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for KnowThyself configuration.
    //!
    //! KNOWTHYSELF_HOME resolution order:
    //! 1. KNOWTHYSELF_HOME environment variable (if set)
    //! 2. ~/.config/knowthyself (default)

    use std::path::PathBuf;

    /// Returns the KnowThyself home directory.
    pub fn knowthyself_home() -> PathBuf {
        if let Ok(home) = std::env::var("KNOWTHYSELF_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("knowthyself"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        knowthyself_home().join("config.toml")
    }
}

/// Default listen address for the gateway.
const DEFAULT_GATEWAY_ADDR: &str = "127.0.0.1:8787";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# KnowThyself gateway configuration

# LangGraph agent backend.
# langgraph_base_url = "http://localhost:2024"
# langgraph_api_key = ""

# File-serving backend for introspection artifacts.
# Falls back to langgraph_base_url when unset.
# files_base_url = "http://localhost:2024"

# Address the gateway binds to with `knowthyself serve`.
gateway_addr = "127.0.0.1:8787"

# Gateway URL the chat/send commands talk to.
# Defaults to http://<gateway_addr>.
# gateway_url = "http://127.0.0.1:8787"
"#;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the LangGraph agent backend
    pub langgraph_base_url: Option<String>,

    /// API key for the LangGraph backend (sent as `X-Api-Key`)
    pub langgraph_api_key: Option<String>,

    /// Base URL of the file-serving backend; falls back to the LangGraph URL
    pub files_base_url: Option<String>,

    /// Address the gateway listens on
    pub gateway_addr: String,

    /// Gateway URL the chat client talks to
    pub gateway_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            langgraph_base_url: None,
            langgraph_api_key: None,
            files_base_url: None,
            gateway_addr: DEFAULT_GATEWAY_ADDR.to_string(),
            gateway_url: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
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

        write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Resolves the gateway URL the chat client should talk to.
    ///
    /// Order: `KNOWTHYSELF_GATEWAY_URL` env var, `gateway_url` from the file,
    /// then `http://<gateway_addr>`.
    pub fn resolved_gateway_url(&self) -> String {
        if let Some(url) = env_value("KNOWTHYSELF_GATEWAY_URL") {
            return url;
        }
        if let Some(url) = self
            .gateway_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            return url.to_string();
        }
        format!("http://{}", self.gateway_addr)
    }

    /// Resolves the listen address for the gateway.
    ///
    /// `KNOWTHYSELF_GATEWAY_ADDR` env var wins over `gateway_addr`.
    pub fn resolved_gateway_addr(&self) -> String {
        env_value("KNOWTHYSELF_GATEWAY_ADDR").unwrap_or_else(|| self.gateway_addr.clone())
    }

    /// Resolves the file-backend base URL, if any is configured.
    ///
    /// Order: `KNOWTHYSELF_FILES_BASE_URL` env var, `files_base_url` from the
    /// file, then the LangGraph base URL (env or file). `None` when nothing
    /// is configured; the file proxies answer 500 in that case.
    pub fn resolved_files_base_url(&self) -> Option<String> {
        env_value("KNOWTHYSELF_FILES_BASE_URL")
            .or_else(|| trimmed(self.files_base_url.as_deref()))
            .or_else(|| env_value("LANGGRAPH_BASE_URL"))
            .or_else(|| trimmed(self.langgraph_base_url.as_deref()))
    }
}

/// Writes config content to a file, creating parent directories as needed.
/// Uses atomic write (temp file + rename) to prevent corruption.
fn write_config(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move config into place at {}", path.display()))?;
    Ok(())
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error when the winning value is not a valid URL.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(default_url.to_string())
}

/// Resolves an optional value with precedence: env > config.
pub fn resolve_optional(config_value: Option<&str>, env_var: &str) -> Option<String> {
    env_value(env_var).or_else(|| trimmed(config_value))
}

fn env_value(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str, service_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {service_name} base URL: {url}"))?;
    Ok(())
}
