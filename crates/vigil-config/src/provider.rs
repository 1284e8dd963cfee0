use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::notify::NotifyConfig;
use crate::retry::RetryPolicy;

/// Default wait between crawl status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default wall-clock budget for one whole execution.
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 300;

/// Configuration for one logical content provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
  /// Key prefix identifying this provider's files in the source bucket,
  /// e.g. `"beta-content-provider"`.
  pub provider_path: String,
  /// Bucket whose upload events trigger this pipeline.
  pub source_bucket: String,
  /// Crawler resource covering the provider's storage path.
  pub crawler_name: String,
  /// Catalog database the crawler registers schemas into.
  pub database_name: String,
  /// Query-service workgroup that owns runs for this provider.
  pub workgroup: String,
  /// Quality query text. `${DATABASE}` and `${TABLE}` placeholders are
  /// resolved by [`ProviderConfig::resolved_query`]; anything else is opaque.
  pub query: String,
  pub notify: NotifyConfig,
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs: u64,
  #[serde(default = "default_execution_timeout_secs")]
  pub execution_timeout_secs: u64,
  #[serde(default)]
  pub retry: RetryPolicy,
}

fn default_poll_interval_secs() -> u64 {
  DEFAULT_POLL_INTERVAL_SECS
}

fn default_execution_timeout_secs() -> u64 {
  DEFAULT_EXECUTION_TIMEOUT_SECS
}

impl ProviderConfig {
  /// Load a provider config from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let config: ProviderConfig =
      serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      })?;

    config.validate()?;
    Ok(config)
  }

  /// Check the fields that have to be present for an execution to make sense.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let required = [
      ("provider_path", &self.provider_path),
      ("source_bucket", &self.source_bucket),
      ("crawler_name", &self.crawler_name),
      ("database_name", &self.database_name),
      ("workgroup", &self.workgroup),
      ("query", &self.query),
    ];

    for (name, value) in required {
      if value.is_empty() {
        return Err(ConfigError::Invalid {
          message: format!("'{}' must not be empty", name),
        });
      }
    }

    if self.notify.message.is_empty() {
      return Err(ConfigError::Invalid {
        message: "'notify.message' must not be empty".to_string(),
      });
    }

    Ok(())
  }

  /// Catalog table name derived from the provider path.
  pub fn table_name(&self) -> String {
    self.provider_path.replace('-', "_")
  }

  /// Query text with `${DATABASE}` and `${TABLE}` placeholders resolved.
  pub fn resolved_query(&self) -> String {
    self
      .query
      .replace("${DATABASE}", &self.database_name)
      .replace("${TABLE}", &self.table_name())
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs)
  }

  pub fn execution_timeout(&self) -> Duration {
    Duration::from_secs(self.execution_timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;
  use crate::retry::RetryBackoff;

  fn sample_config_json() -> serde_json::Value {
    serde_json::json!({
      "provider_path": "beta-content-provider",
      "source_bucket": "vigil-dev-input",
      "crawler_name": "beta-content-provider-devCrawler",
      "database_name": "quality_catalog",
      "workgroup": "beta-content-provider-devWorkgroup",
      "query": "SELECT * FROM ${DATABASE}.${TABLE} WHERE provider = ?",
      "notify": {
        "message": "File {{ file_name }} scored {{ score }}.",
        "success_topic": "beta-success",
        "fail_topic": "beta-fail"
      }
    })
  }

  #[test]
  fn test_defaults_applied() {
    let config: ProviderConfig = serde_json::from_value(sample_config_json()).unwrap();

    assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    assert_eq!(config.execution_timeout_secs, DEFAULT_EXECUTION_TIMEOUT_SECS);
    assert_eq!(config.retry.max_attempts, 6);
    assert_eq!(config.retry.backoff, RetryBackoff::Exponential);
  }

  #[test]
  fn test_query_placeholder_resolution() {
    let config: ProviderConfig = serde_json::from_value(sample_config_json()).unwrap();

    assert_eq!(config.table_name(), "beta_content_provider");
    assert_eq!(
      config.resolved_query(),
      "SELECT * FROM quality_catalog.beta_content_provider WHERE provider = ?"
    );
  }

  #[test]
  fn test_validate_rejects_empty_fields() {
    let mut value = sample_config_json();
    value["crawler_name"] = serde_json::json!("");
    let config: ProviderConfig = serde_json::from_value(value).unwrap();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
  }

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", sample_config_json()).unwrap();

    let config = ProviderConfig::load(file.path()).unwrap();
    assert_eq!(config.provider_path, "beta-content-provider");
  }

  #[test]
  fn test_load_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = ProviderConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
