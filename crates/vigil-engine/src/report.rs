//! Execution reports.

use serde::{Deserialize, Serialize};
use vigil_workflow::{Fault, Results};

/// Terminal outcome of an execution that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
  Succeeded,
  Failed,
}

/// Result of a complete pipeline execution.
///
/// A `Failed` outcome carries the validation fault in `results.error`; the
/// full results document doubles as the diagnostic cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
  /// Unique execution ID.
  pub execution_id: String,
  pub outcome: Outcome,
  /// The accumulated results document, one sub-path per step.
  pub results: Results,
}

impl ExecutionReport {
  /// The validation fault, present only for `Failed` outcomes.
  pub fn fault(&self) -> Option<&Fault> {
    self.results.error.as_ref()
  }
}
