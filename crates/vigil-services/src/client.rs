//! Client traits for the external services vigil orchestrates.
//!
//! All traits use native `async fn`; the engine is generic over its clients
//! and drives them from a single logical task, so no `Send` bounds are
//! required on the returned futures.

use crate::error::ServiceError;
use crate::types::{CrawlerStatus, PublishResponse, QueryExecution, ResultSet};

/// Client for the crawl service that scans stored files and registers their
/// schema in the catalog.
pub trait CrawlClient {
  /// Start a crawl of the provider's storage path.
  ///
  /// Starting is an idempotent trigger: implementations must treat a crawl
  /// that is already running as success, not an error.
  async fn start_crawl(&self, crawler: &str) -> Result<(), ServiceError>;

  /// Query the crawler's current state.
  async fn get_status(&self, crawler: &str) -> Result<CrawlerStatus, ServiceError>;
}

/// Parameters for one query run.
#[derive(Debug, Clone, Copy)]
pub struct StartQueryRequest<'a> {
  /// The full query text. Treated as opaque; placeholder resolution happens
  /// at config load.
  pub query: &'a str,
  /// Positional execution parameters substituted by the query service.
  pub execution_parameters: &'a [String],
  /// Catalog database to run against.
  pub database: &'a str,
  /// Workgroup that owns the run and its output location.
  pub workgroup: &'a str,
}

/// Client for the catalog query service.
pub trait QueryClient {
  /// Run a query synchronously to completion.
  async fn start_query(
    &self,
    request: StartQueryRequest<'_>,
  ) -> Result<QueryExecution, ServiceError>;

  /// Retrieve the full result set of a completed query run.
  async fn fetch_results(&self, query_execution_id: &str) -> Result<ResultSet, ServiceError>;
}

/// Client for the notification channel.
pub trait NotifyClient {
  /// Publish one message to the given topic.
  async fn publish(
    &self,
    topic: &str,
    subject: &str,
    message: &str,
  ) -> Result<PublishResponse, ServiceError>;
}
