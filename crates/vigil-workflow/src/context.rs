use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vigil_services::{CrawlState, CrawlerStatus, QueryExecution, ResultSet};
use vigil_trigger::UploadEvent;

use crate::fault::Fault;

/// Per-execution state threaded through the state machine.
///
/// One context is created per triggering event and owned by a single logical
/// task; steps mutate it through `&mut` and nothing is shared across
/// concurrent executions.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
  pub execution_id: String,
  /// The triggering event. Immutable for the lifetime of the execution.
  pub event: UploadEvent,
  pub results: Results,
}

impl ExecutionContext {
  pub fn new(execution_id: String, event: UploadEvent) -> Self {
    Self {
      execution_id,
      event,
      results: Results::default(),
    }
  }

  /// Whether the most recent crawl status reported the crawler running.
  pub fn crawl_is_running(&self) -> bool {
    self
      .results
      .crawl
      .as_ref()
      .is_some_and(|status| status.state == CrawlState::Running)
  }

  /// Whether the normalized results carry `success == true`.
  ///
  /// An absent mapping or absent flag counts as failure; a degraded
  /// normalization naturally routes the execution to the failure branch.
  pub fn validation_succeeded(&self) -> bool {
    self
      .results
      .normalized
      .as_ref()
      .and_then(|results| results.get("success"))
      .and_then(Value::as_bool)
      .unwrap_or(false)
  }
}

/// The accumulated results document, with one sub-path per step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
  /// Latest crawler status snapshot.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub crawl: Option<CrawlerStatus>,
  /// Query step outputs.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub query: Option<QueryResults>,
  /// Normalized result record, keyed by column name.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub normalized: Option<Map<String, Value>>,
  /// Publish outcome.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notify: Option<NotifyResult>,
  /// Validation fault, present only on the failure branch.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<Fault>,
}

/// Outputs accumulated by the query steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
  /// Positional parameters derived from the triggering event.
  pub execution_parameters: Vec<String>,
  /// Identifiers assigned by the query run, immutable once set.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub execution: Option<QueryExecution>,
  /// The fetched result set, consumed once by normalization.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result_set: Option<ResultSet>,
}

/// Captured outcome of the notification publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResult {
  pub status_code: u16,
  pub subject: String,
}
