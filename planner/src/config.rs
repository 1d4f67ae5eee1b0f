//! Configuration loading

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/planner/
///
/// Returns the path if found, None otherwise.
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        // Also check planner/ subdirectory (for workspace root detection)
        let crate_candidate = current.join("planner").join(filename);
        if crate_candidate.exists() {
            return Some(crate_candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("planner").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Load `.env` from the current directory or a parent, if one exists
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env: {}", e),
    }
}

// ============================================================================
// Planner Configuration (.planner.toml)
// ============================================================================

/// Top-level planner configuration (from .planner.toml)
#[derive(Debug, Default, Deserialize)]
pub struct PlannerFileConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerSectionConfig,
    #[serde(default)]
    pub crew: CrewSectionConfig,
}

/// Which LLM backend serves the crew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Any OpenAI-compatible chat completions endpoint
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// LLM configuration section
#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Endpoint override; defaults per provider, see [`LlmConfig::base_url`]
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// HTTP server section
#[derive(Debug, Deserialize)]
pub struct ServerSectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// How dangling milestone task references are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Accept silently
    Ignore,
    /// Accept and log each dangling reference
    #[default]
    Warn,
    /// Fail the run
    Reject,
}

/// Crew section
#[derive(Debug, Deserialize)]
pub struct CrewSectionConfig {
    /// Directory holding agents.yaml and tasks.yaml
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
    #[serde(default)]
    pub reference_policy: ReferencePolicy,
}

// Default value functions
fn default_model() -> String {
    "gpt-4o".to_string()
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_config_dir() -> String {
    "config".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
        }
    }
}

impl Default for ServerSectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CrewSectionConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            reference_policy: ReferencePolicy::default(),
        }
    }
}

impl LlmConfig {
    /// Configured endpoint, or the provider's usual one
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.as_str(),
            (None, LlmProvider::OpenAi) => OPENAI_BASE_URL,
            (None, LlmProvider::Ollama) => OLLAMA_BASE_URL,
        }
    }

    /// Read the API key from the configured environment variable.
    ///
    /// A missing key is not an error here; the provider rejects the call.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

impl CrewSectionConfig {
    /// Resolve the crew config directory.
    ///
    /// `~` and `$VAR` are expanded. A relative path is taken from the current
    /// directory first, then searched for walking up (so running from a
    /// workspace root finds `planner/config`).
    pub fn resolve_config_dir(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.config_dir)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.config_dir.clone());
        let path = PathBuf::from(expanded);

        if path.is_absolute() || path.is_dir() {
            return path;
        }

        find_config_file(&self.config_dir)
            .filter(|p| p.is_dir())
            .unwrap_or(path)
    }
}

impl PlannerFileConfig {
    /// Load config from .planner.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .planner.toml
    /// 2. Check ~/.config/planner/.planner.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        if let Some(config_path) = find_config_file(".planner.toml") {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No .planner.toml found, using defaults");
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlannerFileConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
