use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Settings for the local HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the generation server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Whether log output uses ANSI colors.
    #[serde(default = "default_log_ansi")]
    pub log_ansi: bool,
}

/// Settings for the upstream generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the provider API.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Model identifier passed to `streamGenerateContent`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    ///
    /// The key itself never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature; low by default for stable code output.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Timeout for the request phase, up to response headers (default: 120).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Idle timeout between streamed fragments in seconds (default: 30).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_log_ansi() -> bool {
    true
}

fn default_provider_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_connect_timeout() -> u32 {
    10
}

fn default_request_timeout() -> u32 {
    120
}

fn default_idle_timeout() -> u32 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_ansi: default_log_ansi(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}
