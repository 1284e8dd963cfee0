use thiserror::Error;

/// Errors surfaced by external service clients.
///
/// The engine only retries errors classified as transient, and only at the
/// query step. Everything else propagates to top-level failure handling.
#[derive(Debug, Error)]
pub enum ServiceError {
  /// The client timed out waiting for the service.
  #[error("client timed out calling {service}: {message}")]
  Timeout { service: &'static str, message: String },

  /// The service raised its own exception type.
  #[error("{service} raised a service exception: {message}")]
  ServiceException { service: &'static str, message: String },

  /// A generic SDK-level failure with no more specific classification.
  #[error("sdk error calling {service}: {message}")]
  Sdk { service: &'static str, message: String },

  /// The service rejected the request outright (bad input, permissions).
  /// Never retried.
  #[error("{service} rejected the request: {message}")]
  Rejected { service: &'static str, message: String },
}

impl ServiceError {
  /// Whether this error is worth retrying.
  pub fn is_transient(&self) -> bool {
    !matches!(self, ServiceError::Rejected { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transient_classification() {
    let timeout = ServiceError::Timeout {
      service: "query",
      message: "deadline exceeded".to_string(),
    };
    let rejected = ServiceError::Rejected {
      service: "query",
      message: "access denied".to_string(),
    };

    assert!(timeout.is_transient());
    assert!(!rejected.is_transient());
  }
}
