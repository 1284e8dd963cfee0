//! Error types for pipeline execution.

use thiserror::Error;
use vigil_services::ServiceError;
use vigil_workflow::State;

/// Hard errors that terminate an execution abnormally.
///
/// A validation failure is NOT an error: it is the expected negative outcome
/// and surfaces as a `Failed` outcome in the [`ExecutionReport`] with a
/// structured fault attached. These variants cover everything else - service
/// failures, exhausted retries, timeouts, cancellation - so monitoring can
/// distinguish the two by shape.
///
/// [`ExecutionReport`]: crate::ExecutionReport
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// A crawl service call failed.
  #[error("crawl service call failed: {source}")]
  Crawl {
    #[source]
    source: ServiceError,
  },

  /// The query run failed, after retries where applicable.
  #[error("query execution failed: {source}")]
  Query {
    #[source]
    source: ServiceError,
  },

  /// Fetching the completed query's results failed.
  #[error("failed to fetch query results: {source}")]
  QueryResults {
    #[source]
    source: ServiceError,
  },

  /// The notification publish failed. Never retried.
  #[error("notification publish failed: {source}")]
  Publish {
    #[source]
    source: ServiceError,
  },

  /// The triggering object key has no sub-provider segment to derive the
  /// query parameter from.
  #[error("object key '{key}' has no sub-provider segment")]
  InvalidObjectKey { key: String },

  /// Rendering the notification message template failed.
  #[error("failed to render notification message: {message}")]
  Template { message: String },

  /// A step ran before its upstream output was recorded.
  #[error("missing upstream result entering state '{state}': {field}")]
  MissingStepOutput { state: State, field: &'static str },

  /// The execution exceeded the overall wall-clock timeout.
  #[error("execution '{execution_id}' exceeded its overall timeout")]
  Timeout { execution_id: String },

  /// The execution was cancelled.
  #[error("execution cancelled")]
  Cancelled,
}
