use serde::{Deserialize, Serialize};

/// Error type attached when an ingested file fails query validation.
pub const INVALID_CONTENT_PROVIDER_FILE_ERROR: &str = "InvalidContentProviderFileError";

/// Structured error attached to an execution that terminates in `Failed`.
///
/// A fault is the expected negative outcome of validation, not a system
/// error; hard errors surface through the engine's error type instead, so
/// monitoring can tell the two apart by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fault {
  pub error_type: String,
  pub error_message: String,
}

impl Fault {
  /// The fault attached by the failure branch of the evaluation gate.
  pub fn invalid_content_provider_file() -> Self {
    Self {
      error_type: INVALID_CONTENT_PROVIDER_FILE_ERROR.to_string(),
      error_message: "Ingested content provider file failed query validation.".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fault_serializes_camel_case() {
    let fault = Fault::invalid_content_provider_file();
    let value = serde_json::to_value(&fault).unwrap();

    assert_eq!(value["errorType"], "InvalidContentProviderFileError");
    assert_eq!(
      value["errorMessage"],
      "Ingested content provider file failed query validation."
    );
  }
}
