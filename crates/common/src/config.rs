use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub yelp: YelpConfig,
    #[serde(default)]
    pub hitl: HitlConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key, if any
    pub api_key_env: Option<String>,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            api_key_env: None,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YelpConfig {
    pub base_url: String,
    /// API key; overridden by YELP_API_KEY when set
    pub api_key: Option<String>,
    pub default_location: String,
    pub default_limit: usize,
}

impl Default for YelpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.yelp.com/v3".to_string(),
            api_key: None,
            default_location: "San Francisco, CA".to_string(),
            default_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitlConfig {
    /// Whether agent responses are gated through human approval
    pub enabled: bool,
    /// Names of predefined policies to install at startup.
    /// Policy predicates are code-level configuration; only the
    /// built-in catalog can be selected here.
    pub policies: Vec<String>,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            policies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Optional JSON file with the product knowledge documents.
    /// Falls back to the built-in demo catalog when unset.
    pub knowledge_path: Option<PathBuf>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_path: None,
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

impl SystemConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("failed to read {}: {}", path, e)))?;
        let mut config: SystemConfig = toml::from_str(&content)
            .map_err(|e| AgentError::Config(format!("failed to parse {}: {}", path, e)))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Secrets come from the environment, never from the config file
    /// checked into a repository.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("YELP_API_KEY") {
            if !key.is_empty() {
                self.yelp.api_key = Some(key);
            }
        }
    }

    pub fn llm_api_key(&self) -> Option<String> {
        self.llm
            .api_key_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.is_empty())
    }
}
