use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::AggregatorConfig;

/// Load configuration from a file using the config crate
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub async fn load_config(config_path: &str) -> Result<AggregatorConfig> {
    load_config_sync(config_path)
}

/// Load configuration synchronously
pub fn load_config_sync(config_path: &str) -> Result<AggregatorConfig> {
    let config_path = Path::new(config_path);

    // Determine file format based on extension
    let format = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("toml") => FileFormat::Toml,
        _ => FileFormat::Yaml, // Default to YAML
    };

    let settings = Config::builder()
        .add_source(File::new(
            config_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", config_path.display()))?,
            format,
        ))
        .build()
        .with_context(|| format!("Failed to build config from {}", config_path.display()))?;

    let aggregator_config: AggregatorConfig = settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize config from {}",
            config_path.display()
        )
    })?;

    Ok(aggregator_config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn test_load_yaml_config() {
        let yaml_content = r#"
conn_timeout_secs: 3
poll_interval_secs: 15
tls_resolver: "myresolver"
endpoints:
  - host: "a.example"
    api_port: 8080
    web_port: 8081
  - host: "b.example"
    api_port: 8080
    web_port: 8081
    tls:
      ignore_insecure: true
provider:
  listen_addr: "127.0.0.1:9000"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.conn_timeout_secs, 3);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.tls_resolver.as_deref(), Some("myresolver"));
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].host, "a.example");
        assert!(config.endpoints[0].tls.is_none());
        assert!(
            config.endpoints[1]
                .tls
                .as_ref()
                .is_some_and(|tls| tls.ignore_insecure)
        );
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let json_content = r#"
{
  "conn_timeout_secs": 5,
  "poll_interval_secs": 30,
  "endpoints": [
    {"host": "a.example", "api_port": 8080, "web_port": 8081}
  ]
}
"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.endpoints.len(), 1);
        assert!(config.tls_resolver.is_none());
        // Unset provider section falls back to the default listen address.
        assert_eq!(config.provider.listen_addr, "127.0.0.1:9000");
    }
}
