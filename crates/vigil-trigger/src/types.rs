use serde::{Deserialize, Serialize};

/// Detail type carried by object-creation notifications.
pub const OBJECT_CREATED: &str = "Object Created";

/// An upload-notification event emitted when an object lands in a bucket.
///
/// The wire shape follows the object store's notification format:
/// `{"source": "...", "detailType": "Object Created", "detail": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEvent {
  /// Emitting system, e.g. `"aws.objectstore"`.
  pub source: String,
  #[serde(rename = "detailType")]
  pub detail_type: String,
  pub detail: UploadDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadDetail {
  pub bucket: BucketRef,
  pub object: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRef {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
  pub key: String,
}

impl UploadEvent {
  pub fn new(source: &str, bucket: &str, key: &str) -> Self {
    Self {
      source: source.to_string(),
      detail_type: OBJECT_CREATED.to_string(),
      detail: UploadDetail {
        bucket: BucketRef {
          name: bucket.to_string(),
        },
        object: ObjectRef {
          key: key.to_string(),
        },
      },
    }
  }

  pub fn bucket_name(&self) -> &str {
    &self.detail.bucket.name
  }

  pub fn object_key(&self) -> &str {
    &self.detail.object.key
  }

  /// The query execution parameter derived from the object key: the second
  /// `/`-separated segment, identifying the logical sub-provider.
  ///
  /// `None` when the key has no second segment; the engine treats that as a
  /// hard failure.
  pub fn execution_parameter(&self) -> Option<&str> {
    self.object_key().split('/').nth(1)
  }
}

/// Filter deciding which upload events start an execution.
///
/// An event matches when its detail type is [`OBJECT_CREATED`], its bucket
/// name equals the configured source bucket, and its object key starts with
/// the provider's path prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPattern {
  pub bucket_name: String,
  pub key_prefix: String,
}

impl EventPattern {
  pub fn new(bucket_name: &str, key_prefix: &str) -> Self {
    Self {
      bucket_name: bucket_name.to_string(),
      key_prefix: key_prefix.to_string(),
    }
  }

  pub fn matches(&self, event: &UploadEvent) -> bool {
    event.detail_type == OBJECT_CREATED
      && event.bucket_name() == self.bucket_name
      && event.object_key().starts_with(&self.key_prefix)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_event_deserializes_from_notification_shape() {
    let json = serde_json::json!({
      "source": "aws.objectstore",
      "detailType": "Object Created",
      "detail": {
        "bucket": { "name": "vigil-dev-input" },
        "object": { "key": "beta-content-provider/valid-file.csv" }
      }
    });

    let event: UploadEvent = serde_json::from_value(json).unwrap();
    assert_eq!(event.bucket_name(), "vigil-dev-input");
    assert_eq!(event.object_key(), "beta-content-provider/valid-file.csv");
  }

  #[test]
  fn test_execution_parameter_extraction() {
    let event = UploadEvent::new(
      "aws.objectstore",
      "vigil-dev-input",
      "beta-content-provider/acme/valid-file.csv",
    );
    assert_eq!(event.execution_parameter(), Some("acme"));

    let flat = UploadEvent::new("aws.objectstore", "vigil-dev-input", "no-segments");
    assert_eq!(flat.execution_parameter(), None);
  }

  #[test]
  fn test_pattern_matches_bucket_and_prefix() {
    let pattern = EventPattern::new("vigil-dev-input", "beta-content-provider");
    let event = UploadEvent::new(
      "aws.objectstore",
      "vigil-dev-input",
      "beta-content-provider/valid-file.csv",
    );

    assert!(pattern.matches(&event));
  }

  #[test]
  fn test_pattern_rejects_other_bucket_or_prefix() {
    let pattern = EventPattern::new("vigil-dev-input", "beta-content-provider");

    let wrong_bucket = UploadEvent::new(
      "aws.objectstore",
      "other-bucket",
      "beta-content-provider/file.csv",
    );
    assert!(!pattern.matches(&wrong_bucket));

    let wrong_prefix = UploadEvent::new(
      "aws.objectstore",
      "vigil-dev-input",
      "gamma-content-provider/file.csv",
    );
    assert!(!pattern.matches(&wrong_prefix));
  }

  #[test]
  fn test_pattern_rejects_other_detail_types() {
    let pattern = EventPattern::new("vigil-dev-input", "beta-content-provider");
    let mut event = UploadEvent::new(
      "aws.objectstore",
      "vigil-dev-input",
      "beta-content-provider/file.csv",
    );
    event.detail_type = "Object Deleted".to_string();

    assert!(!pattern.matches(&event));
  }
}
