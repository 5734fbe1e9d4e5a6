//! Server configuration types
//!
//! Loaded from `config/default.toml` (optional) with `BRANDFORGE__*`
//! environment overrides, e.g. `BRANDFORGE__SERVER__PORT=9090`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Streaming protocol settings
    #[serde(default)]
    pub stream: StreamConfig,
    /// Handoff router settings
    #[serde(default)]
    pub router: RouterSettings,
    /// Generation settings
    #[serde(default)]
    pub generation: GenerationSettings,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("BRANDFORGE").separator("__"))
            .build()
            .context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Streaming protocol settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Seconds between heartbeat events while a task runs
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    /// Heartbeats before the stream gives up with a timeout error
    #[serde(default = "default_max_heartbeats")]
    pub max_heartbeats: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            max_heartbeats: default_max_heartbeats(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    15
}

// 40 heartbeats at 15s is a ten minute ceiling, well past the slowest
// observed generation.
fn default_max_heartbeats() -> u32 {
    40
}

/// Handoff router settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Maximum turns attributed to the external caller
    #[serde(default = "default_max_user_turns")]
    pub max_user_turns: usize,
    /// Maximum coordinator/specialist hops per run
    #[serde(default = "default_max_agent_hops")]
    pub max_agent_hops: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_user_turns: default_max_user_turns(),
            max_agent_hops: default_max_agent_hops(),
        }
    }
}

fn default_max_user_turns() -> usize {
    10
}

fn default_max_agent_hops() -> usize {
    50
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Character budget for the image model's prompt
    #[serde(default = "default_image_prompt_budget")]
    pub image_prompt_budget: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            image_prompt_budget: default_image_prompt_budget(),
        }
    }
}

fn default_image_prompt_budget() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.stream.heartbeat_interval_secs, 15);
        assert_eq!(config.stream.max_heartbeats, 40);
        assert_eq!(config.router.max_user_turns, 10);
        assert_eq!(config.generation.image_prompt_budget, 1000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("[server]\nport = 9090\n").unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.stream.max_heartbeats, 40);
    }
}
