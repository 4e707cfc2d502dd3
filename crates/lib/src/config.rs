//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.packaroo/config.json`) and environment.
//! Values set in the file win over environment fallbacks, except secrets: `GOOGLE_AI_API_KEY`
//! overrides `agents.gemini.apiKey`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 3004;
const DEFAULT_SERVER_BIND: &str = "127.0.0.1";
const DEFAULT_DIRECTORY_URL: &str = "http://localhost:3000";
const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote package directory (the package/tracking API).
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Text-generation backend and model defaults.
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Server bind and port. Unset values fall back to AI_SERVICE_HOST / AI_SERVICE_PORT, then defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub bind: Option<String>,
}

/// Package directory base URL and per-request timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryConfig {
    /// Base URL of the package API gateway. Falls back to GATEWAY_URL, then http://localhost:3000.
    pub base_url: Option<String>,

    /// Timeout for each outbound lookup, in seconds (default 30).
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_directory_timeout_secs() -> u64 {
    DEFAULT_DIRECTORY_TIMEOUT_SECS
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_directory_timeout_secs(),
        }
    }
}

/// Agent defaults (backend, model, sampling, workspace).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    /// "gemini" (default) or "ollama", case-insensitive.
    pub default_backend: Option<String>,
    /// Model name passed as-is to the backend. Falls back to GOOGLE_AI_MODEL for gemini.
    pub default_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Workspace root (default ~/.packaroo/workspace). A non-empty SYSTEM.md here replaces the bundled system prompt.
    pub workspace: Option<PathBuf>,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            default_backend: None,
            default_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            workspace: None,
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    /// API key. Overridden by GOOGLE_AI_API_KEY env when set.
    pub api_key: Option<String>,
    /// API root (default https://generativelanguage.googleapis.com).
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OllamaConfig {
    /// Ollama server (default http://127.0.0.1:11434).
    pub base_url: Option<String>,
}

/// Which text-generation backend to use (from agents.defaultBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationBackend {
    Gemini,
    Ollama,
}

impl GenerationBackend {
    pub fn name(self) -> &'static str {
        match self {
            GenerationBackend::Gemini => "gemini",
            GenerationBackend::Ollama => "ollama",
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve backend from config. Defaults to Gemini when absent or unrecognized.
pub fn resolve_backend(agents: &AgentsConfig) -> GenerationBackend {
    let b = agents
        .default_backend
        .as_deref()
        .unwrap_or("gemini")
        .trim()
        .to_lowercase();
    if b == "ollama" {
        GenerationBackend::Ollama
    } else {
        GenerationBackend::Gemini
    }
}

/// Resolve the model: config, then GOOGLE_AI_MODEL (gemini only), then the backend fallback.
pub fn resolve_model(agents: &AgentsConfig, backend: GenerationBackend) -> String {
    if let Some(m) = non_empty(agents.default_model.as_ref()) {
        return m;
    }
    match backend {
        GenerationBackend::Gemini => {
            non_empty_env("GOOGLE_AI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
        }
        GenerationBackend::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
    }
}

/// Resolve the Gemini API key: env GOOGLE_AI_API_KEY overrides config.
pub fn resolve_gemini_api_key(agents: &AgentsConfig) -> Option<String> {
    non_empty_env("GOOGLE_AI_API_KEY").or_else(|| non_empty(agents.gemini.api_key.as_ref()))
}

/// Resolve the package directory base URL (no trailing slash).
pub fn resolve_directory_base_url(config: &Config) -> String {
    non_empty(config.directory.base_url.as_ref())
        .or_else(|| non_empty_env("GATEWAY_URL"))
        .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Per-request timeout for package directory lookups. Zero is treated as the default.
pub fn resolve_directory_timeout(config: &Config) -> Duration {
    let secs = match config.directory.timeout_secs {
        0 => DEFAULT_DIRECTORY_TIMEOUT_SECS,
        s => s,
    };
    Duration::from_secs(secs)
}

/// Resolve the server port: config, then AI_SERVICE_PORT, then 3004.
pub fn resolve_server_port(config: &Config) -> u16 {
    config
        .server
        .port
        .or_else(|| non_empty_env("AI_SERVICE_PORT").and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Resolve the bind address: config, then AI_SERVICE_HOST, then 127.0.0.1.
pub fn resolve_server_bind(config: &Config) -> String {
    non_empty(config.server.bind.as_ref())
        .or_else(|| non_empty_env("AI_SERVICE_HOST"))
        .unwrap_or_else(|| DEFAULT_SERVER_BIND.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PACKAROO_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".packaroo").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Resolve workspace directory (holds the optional SYSTEM.md override).
/// A relative `agents.workspace` is resolved against the config file's parent.
pub fn resolve_workspace_dir(config: &Config, config_path: &Path) -> PathBuf {
    match &config.agents.workspace {
        Some(w) if !w.as_os_str().is_empty() => {
            if w.is_absolute() {
                w.clone()
            } else {
                config_dir(config_path).join(w)
            }
        }
        _ => config_dir(config_path).join("workspace"),
    }
}

/// Parent directory of the config file ("." when the path has no parent).
pub fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Load config from the given path (or the default). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.directory.timeout_secs, 30);
        assert_eq!(config.agents.max_tokens, 1000);
        assert!((config.agents.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.server.port.is_none());
    }

    #[test]
    fn camel_case_keys_parse() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 8080, "bind": "0.0.0.0" },
                "directory": { "baseUrl": "http://pkg.internal:3000/", "timeoutSecs": 5 },
                "agents": { "defaultBackend": "Ollama", "defaultModel": "qwen3:8b", "gemini": { "apiKey": "k" } }
            }"#,
        )
        .unwrap();
        assert_eq!(resolve_server_port(&config), 8080);
        assert_eq!(resolve_server_bind(&config), "0.0.0.0");
        assert_eq!(resolve_directory_base_url(&config), "http://pkg.internal:3000");
        assert_eq!(resolve_directory_timeout(&config), Duration::from_secs(5));
        assert_eq!(resolve_backend(&config.agents), GenerationBackend::Ollama);
        assert_eq!(
            resolve_model(&config.agents, GenerationBackend::Ollama),
            "qwen3:8b"
        );
    }

    #[test]
    fn unknown_backend_falls_back_to_gemini() {
        let mut agents = AgentsConfig::default();
        assert_eq!(resolve_backend(&agents), GenerationBackend::Gemini);
        agents.default_backend = Some("lmstudio".to_string());
        assert_eq!(resolve_backend(&agents), GenerationBackend::Gemini);
    }

    #[test]
    fn ollama_model_fallback() {
        let agents = AgentsConfig::default();
        assert_eq!(
            resolve_model(&agents, GenerationBackend::Ollama),
            "llama3.2:latest"
        );
    }

    #[test]
    fn zero_timeout_means_default() {
        let mut config = Config::default();
        config.directory.timeout_secs = 0;
        assert_eq!(resolve_directory_timeout(&config), Duration::from_secs(30));
    }

    #[test]
    fn resolve_workspace_dir_default() {
        let config = Config::default();
        let path = Path::new("/home/user/.packaroo/config.json");
        assert_eq!(
            resolve_workspace_dir(&config, path),
            PathBuf::from("/home/user/.packaroo/workspace")
        );
    }

    #[test]
    fn resolve_workspace_dir_override_relative() {
        let mut config = Config::default();
        config.agents.workspace = Some(PathBuf::from("custom/ws"));
        let path = Path::new("/home/user/.packaroo/config.json");
        assert_eq!(
            resolve_workspace_dir(&config, path),
            PathBuf::from("/home/user/.packaroo/custom/ws")
        );
    }

    #[test]
    fn missing_config_file_is_default() {
        let path = std::env::temp_dir().join(format!("packaroo-missing-{}.json", uuid::Uuid::new_v4()));
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert!(config.directory.base_url.is_none());
    }
}
