//! Fixture-backed service clients for local runs.
//!
//! These stand in for the real crawl, query and notification services so a
//! whole pipeline execution can be exercised from the command line: the
//! crawler becomes ready after a configured number of polls, query results
//! are read from a JSON fixture file, and notifications are printed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::info;
use vigil_services::{
  ColumnInfo, CrawlClient, CrawlState, CrawlerStatus, NotifyClient, PublishResponse, QueryClient,
  QueryExecution, ResultSet, ServiceError, StartQueryRequest,
};

/// Crawl client that reports `RUNNING` for a fixed number of polls.
pub struct LocalCrawlClient {
  database: String,
  target_path: String,
  polls_until_ready: u32,
  polls: AtomicU32,
}

impl LocalCrawlClient {
  pub fn new(database: &str, target_path: &str, polls_until_ready: u32) -> Self {
    Self {
      database: database.to_string(),
      target_path: target_path.to_string(),
      polls_until_ready,
      polls: AtomicU32::new(0),
    }
  }
}

impl CrawlClient for LocalCrawlClient {
  async fn start_crawl(&self, crawler: &str) -> Result<(), ServiceError> {
    info!(crawler = %crawler, "local crawl started");
    Ok(())
  }

  async fn get_status(&self, crawler: &str) -> Result<CrawlerStatus, ServiceError> {
    let polls = self.polls.fetch_add(1, Ordering::Relaxed) + 1;
    let state = if polls > self.polls_until_ready {
      CrawlState::Ready
    } else {
      CrawlState::Running
    };

    Ok(CrawlerStatus {
      state,
      name: crawler.to_string(),
      database: self.database.clone(),
      target_path: self.target_path.clone(),
    })
  }
}

/// Query client that serves a result set from a JSON fixture file.
pub struct LocalQueryClient {
  results_file: PathBuf,
}

impl LocalQueryClient {
  pub fn new(results_file: PathBuf) -> Self {
    Self { results_file }
  }
}

impl QueryClient for LocalQueryClient {
  async fn start_query(
    &self,
    request: StartQueryRequest<'_>,
  ) -> Result<QueryExecution, ServiceError> {
    info!(
      database = %request.database,
      workgroup = %request.workgroup,
      parameters = ?request.execution_parameters,
      "local query started"
    );

    Ok(QueryExecution {
      query_execution_id: "local-run".to_string(),
      output_location: self.results_file.display().to_string(),
    })
  }

  async fn fetch_results(&self, _query_execution_id: &str) -> Result<ResultSet, ServiceError> {
    let content =
      tokio::fs::read_to_string(&self.results_file)
        .await
        .map_err(|e| ServiceError::Sdk {
          service: "query",
          message: format!(
            "failed to read results fixture {}: {}",
            self.results_file.display(),
            e
          ),
        })?;

    serde_json::from_str(&content).map_err(|e| ServiceError::Sdk {
      service: "query",
      message: format!(
        "failed to parse results fixture {}: {}",
        self.results_file.display(),
        e
      ),
    })
  }
}

/// Notify client that prints the notification instead of publishing it.
pub struct LocalNotifyClient;

impl NotifyClient for LocalNotifyClient {
  async fn publish(
    &self,
    topic: &str,
    subject: &str,
    message: &str,
  ) -> Result<PublishResponse, ServiceError> {
    eprintln!("[{}] {}", topic, subject);
    eprintln!("{}", message);
    Ok(PublishResponse { status_code: 200 })
  }
}

/// A sample result set fixture, written by `vigil init-fixture`.
pub fn sample_result_set() -> ResultSet {
  ResultSet {
    columns: vec![
      ColumnInfo {
        name: "file_name".to_string(),
        data_type: "string".to_string(),
      },
      ColumnInfo {
        name: "score".to_string(),
        data_type: "double".to_string(),
      },
      ColumnInfo {
        name: "rows_checked".to_string(),
        data_type: "bigint".to_string(),
      },
      ColumnInfo {
        name: "success".to_string(),
        data_type: "boolean".to_string(),
      },
    ],
    rows: vec![
      vec![
        Some("file_name".to_string()),
        Some("score".to_string()),
        Some("rows_checked".to_string()),
        Some("success".to_string()),
      ],
      vec![
        Some("valid-file.csv".to_string()),
        Some("0.98".to_string()),
        Some("120".to_string()),
        Some("true".to_string()),
      ],
    ],
  }
}
