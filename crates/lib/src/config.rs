//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.denti/config.json`) and environment.
//! Backend settings are read once at startup and injected into the clients at
//! construction; nothing reads the process environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge-base query endpoint settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Intent classification endpoint settings.
    #[serde(default)]
    pub intent: IntentConfig,

    /// Scheduling backend settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the health endpoint and bot webhook (default 3978).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    3978
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Knowledge-base endpoint config (host, subscription key, project name).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeConfig {
    /// Endpoint host, e.g. "https://my-language-resource.cognitiveservices.azure.com".
    pub host: Option<String>,
    /// Subscription key. Overridden by DENTI_KNOWLEDGE_KEY env when set.
    pub key: Option<String>,
    /// Knowledge-base project name.
    pub project: Option<String>,
}

impl KnowledgeConfig {
    /// Trimmed endpoint host, when configured.
    pub fn host(&self) -> Option<String> {
        clean(&self.host)
    }

    /// Trimmed project name, when configured.
    pub fn project(&self) -> Option<String> {
        clean(&self.project)
    }
}

/// Intent classification endpoint config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentConfig {
    /// Endpoint host of the language resource.
    pub host: Option<String>,
    /// Subscription key. Overridden by DENTI_INTENT_KEY env when set.
    pub key: Option<String>,
    /// Conversation project name.
    pub project: Option<String>,
    /// Deployment name (default "production").
    pub deployment: Option<String>,
}

impl IntentConfig {
    /// Trimmed endpoint host, when configured.
    pub fn host(&self) -> Option<String> {
        clean(&self.host)
    }

    /// Trimmed project name, when configured.
    pub fn project(&self) -> Option<String> {
        clean(&self.project)
    }

    /// Deployment name, falling back to "production".
    pub fn deployment(&self) -> String {
        clean(&self.deployment).unwrap_or_else(|| "production".to_string())
    }
}

/// Scheduling backend config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Base URL of the scheduling backend, e.g. "https://scheduler.example.com".
    pub base_url: Option<String>,
}

impl SchedulerConfig {
    /// Trimmed base URL without a trailing slash, when configured.
    pub fn base_url(&self) -> Option<String> {
        clean(&self.base_url).map(|u| u.trim_end_matches('/').to_string())
    }
}

/// Trimmed, non-empty value of an optional config string.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the knowledge subscription key: env DENTI_KNOWLEDGE_KEY overrides config.
pub fn resolve_knowledge_key(config: &Config) -> Option<String> {
    std::env::var("DENTI_KNOWLEDGE_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| clean(&config.knowledge.key))
}

/// Resolve the intent subscription key: env DENTI_INTENT_KEY overrides config.
pub fn resolve_intent_key(config: &Config) -> Option<String> {
    std::env::var("DENTI_INTENT_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| clean(&config.intent.key))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("DENTI_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".denti").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or DENTI_CONFIG_PATH). Missing file => default config.
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
