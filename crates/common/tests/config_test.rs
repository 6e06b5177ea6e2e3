use beauty_agent_common::config::SystemConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("test_config.toml");

    let config_content = r#"
[server]
host = "0.0.0.0"
port = 9000

[llm]
base_url = "http://localhost:11434/v1"
model = "llama3.1"
temperature = 0.1

[yelp]
base_url = "https://api.yelp.com/v3"
default_location = "New York, NY"
default_limit = 5

[hitl]
enabled = true
policies = ["review_all_responses", "review_sensitive_data"]

[retrieval]
top_k = 3
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = SystemConfig::load(config_path.to_str().unwrap()).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.llm.model, "llama3.1");
    assert_eq!(config.yelp.default_location, "New York, NY");
    assert!(config.hitl.enabled);
    assert_eq!(config.hitl.policies.len(), 2);
    assert_eq!(config.retrieval.top_k, 3);
    assert!(config.retrieval.knowledge_path.is_none());
}

#[test]
fn test_config_defaults_for_missing_sections() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("minimal.toml");

    fs::write(&config_path, "[server]\nhost = \"127.0.0.1\"\nport = 8080\n").unwrap();

    let config = SystemConfig::load(config_path.to_str().unwrap()).unwrap();

    assert!(!config.hitl.enabled);
    assert!(config.hitl.policies.is_empty());
    assert_eq!(config.yelp.default_limit, 10);
    assert_eq!(config.retrieval.top_k, 5);
}

#[test]
fn test_config_missing_file_is_config_error() {
    let err = SystemConfig::load("/nonexistent/config.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}
