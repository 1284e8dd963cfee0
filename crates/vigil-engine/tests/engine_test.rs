//! End-to-end engine tests against fake service clients.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use vigil_config::{NotifyConfig, ProviderConfig, RetryBackoff, RetryPolicy};
use vigil_engine::{ChannelNotifier, ExecutionError, ExecutionEvent, Outcome, PipelineEngine};
use vigil_services::{
  ColumnInfo, CrawlClient, CrawlState, CrawlerStatus, NotifyClient, PublishResponse, QueryClient,
  QueryExecution, ResultSet, ServiceError, StartQueryRequest,
};
use vigil_trigger::UploadEvent;
use vigil_workflow::State;

fn provider() -> ProviderConfig {
  ProviderConfig {
    provider_path: "beta-content-provider".to_string(),
    source_bucket: "vigil-dev-input".to_string(),
    crawler_name: "beta-content-provider-devCrawler".to_string(),
    database_name: "quality_catalog".to_string(),
    workgroup: "beta-content-provider-devWorkgroup".to_string(),
    query: "SELECT * FROM ${DATABASE}.${TABLE} WHERE file_name = ?".to_string(),
    notify: NotifyConfig {
      message: "File {{ file_name }} scored {{ score }}.".to_string(),
      success_topic: "beta-success".to_string(),
      fail_topic: "beta-fail".to_string(),
      success_subscriptions: vec![],
      fail_subscriptions: vec![],
    },
    poll_interval_secs: 0,
    execution_timeout_secs: 300,
    retry: RetryPolicy {
      max_attempts: 3,
      interval_secs: 0,
      backoff: RetryBackoff::Constant,
      multiplier: 2.0,
    },
  }
}

fn event() -> UploadEvent {
  UploadEvent::new(
    "aws.objectstore",
    "vigil-dev-input",
    "beta-content-provider/valid-file.csv",
  )
}

fn result_set(success: bool) -> ResultSet {
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
        Some(if success { "true" } else { "false" }.to_string()),
      ],
    ],
  }
}

#[derive(Clone)]
struct FakeCrawl {
  ready_after_polls: u32,
  polls: Arc<Mutex<u32>>,
}

impl FakeCrawl {
  fn ready_after(polls: u32) -> Self {
    Self {
      ready_after_polls: polls,
      polls: Arc::new(Mutex::new(0)),
    }
  }
}

impl CrawlClient for FakeCrawl {
  async fn start_crawl(&self, _crawler: &str) -> Result<(), ServiceError> {
    Ok(())
  }

  async fn get_status(&self, crawler: &str) -> Result<CrawlerStatus, ServiceError> {
    let mut polls = self.polls.lock().unwrap();
    *polls += 1;
    let state = if *polls > self.ready_after_polls {
      CrawlState::Ready
    } else {
      CrawlState::Running
    };
    Ok(CrawlerStatus {
      state,
      name: crawler.to_string(),
      database: "quality_catalog".to_string(),
      target_path: "s3://vigil-dev-input/beta-content-provider/".to_string(),
    })
  }
}

#[derive(Clone)]
struct FakeQuery {
  result_set: ResultSet,
  transient_failures: u32,
  calls: Arc<Mutex<u32>>,
  last_request: Arc<Mutex<Option<(String, Vec<String>)>>>,
}

impl FakeQuery {
  fn returning(result_set: ResultSet) -> Self {
    Self {
      result_set,
      transient_failures: 0,
      calls: Arc::new(Mutex::new(0)),
      last_request: Arc::new(Mutex::new(None)),
    }
  }

  fn flaky(result_set: ResultSet, transient_failures: u32) -> Self {
    Self {
      transient_failures,
      ..Self::returning(result_set)
    }
  }
}

impl QueryClient for FakeQuery {
  async fn start_query(
    &self,
    request: StartQueryRequest<'_>,
  ) -> Result<QueryExecution, ServiceError> {
    let mut calls = self.calls.lock().unwrap();
    *calls += 1;
    if *calls <= self.transient_failures {
      return Err(ServiceError::Timeout {
        service: "query",
        message: "deadline exceeded".to_string(),
      });
    }

    *self.last_request.lock().unwrap() = Some((
      request.query.to_string(),
      request.execution_parameters.to_vec(),
    ));
    Ok(QueryExecution {
      query_execution_id: "q-123".to_string(),
      output_location: "s3://vigil-dev-output/beta-content-provider/".to_string(),
    })
  }

  async fn fetch_results(&self, _query_execution_id: &str) -> Result<ResultSet, ServiceError> {
    Ok(self.result_set.clone())
  }
}

#[derive(Clone, Default)]
struct FakeNotify {
  publishes: Arc<Mutex<Vec<(String, String, String)>>>,
  reject: bool,
}

impl NotifyClient for FakeNotify {
  async fn publish(
    &self,
    topic: &str,
    subject: &str,
    message: &str,
  ) -> Result<PublishResponse, ServiceError> {
    if self.reject {
      return Err(ServiceError::Rejected {
        service: "notify",
        message: "access denied".to_string(),
      });
    }
    self.publishes.lock().unwrap().push((
      topic.to_string(),
      subject.to_string(),
      message.to_string(),
    ));
    Ok(PublishResponse { status_code: 200 })
  }
}

#[tokio::test]
async fn test_success_path_publishes_success_notification() {
  let crawl = FakeCrawl::ready_after(2);
  let query = FakeQuery::returning(result_set(true));
  let notify = FakeNotify::default();
  let engine = PipelineEngine::new(provider(), crawl.clone(), query.clone(), notify.clone());

  let report = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(report.outcome, Outcome::Succeeded);
  assert!(report.fault().is_none());

  // Two running polls plus the ready one.
  assert_eq!(*crawl.polls.lock().unwrap(), 3);

  // Placeholders resolved, execution parameter derived from the object key.
  let (query_text, parameters) = query.last_request.lock().unwrap().clone().unwrap();
  assert_eq!(
    query_text,
    "SELECT * FROM quality_catalog.beta_content_provider WHERE file_name = ?"
  );
  assert_eq!(parameters, vec!["valid-file.csv".to_string()]);

  let publishes = notify.publishes.lock().unwrap();
  assert_eq!(publishes.len(), 1);
  let (topic, subject, message) = &publishes[0];
  assert_eq!(topic, "beta-success");
  assert_eq!(
    subject,
    "Data quality monitoring job for beta-content-provider succeeded."
  );
  assert_eq!(message, "File valid-file.csv scored 0.98.");

  let notify_result = report.results.notify.unwrap();
  assert_eq!(notify_result.status_code, 200);
  assert_eq!(notify_result.subject, *subject);
}

#[tokio::test]
async fn test_validation_failure_publishes_fail_and_records_fault() {
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(result_set(false)),
    FakeNotify::default(),
  );

  let report = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(report.outcome, Outcome::Failed);
  let fault = report.fault().unwrap();
  assert_eq!(fault.error_type, "InvalidContentProviderFileError");
  assert_eq!(
    fault.error_message,
    "Ingested content provider file failed query validation."
  );

  assert_eq!(
    report.results.notify.unwrap().subject,
    "Data quality monitoring job for beta-content-provider failed."
  );
}

#[tokio::test]
async fn test_anomalous_result_set_routes_to_failure_branch() {
  let mut anomalous = result_set(true);
  anomalous.rows.push(vec![
    Some("extra".to_string()),
    Some("1.0".to_string()),
    Some("1".to_string()),
    Some("true".to_string()),
  ]);
  let notify = FakeNotify::default();
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(anomalous),
    notify.clone(),
  );

  let report = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap();

  // Normalization degrades to an empty mapping; the gate reads that as a
  // failed validation, not a system error.
  assert_eq!(report.outcome, Outcome::Failed);
  assert_eq!(report.results.normalized.unwrap().len(), 0);
  assert_eq!(notify.publishes.lock().unwrap()[0].0, "beta-fail");
}

#[tokio::test]
async fn test_transient_query_failures_are_retried() {
  let query = FakeQuery::flaky(result_set(true), 2);
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    query.clone(),
    FakeNotify::default(),
  );

  let report = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(report.outcome, Outcome::Succeeded);
  assert_eq!(*query.calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_fails_the_execution() {
  let query = FakeQuery::flaky(result_set(true), u32::MAX);
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    query.clone(),
    FakeNotify::default(),
  );

  let err = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ExecutionError::Query { .. }));
  assert_eq!(*query.calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_rejected_publish_fails_the_execution() {
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(result_set(true)),
    FakeNotify {
      reject: true,
      ..FakeNotify::default()
    },
  );

  let err = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ExecutionError::Publish { .. }));
}

#[tokio::test]
async fn test_flat_object_key_fails_the_execution() {
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(result_set(true)),
    FakeNotify::default(),
  );

  let flat = UploadEvent::new("aws.objectstore", "vigil-dev-input", "orphan.csv");
  let err = engine
    .execute(flat, CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ExecutionError::InvalidObjectKey { .. }));
}

#[tokio::test]
async fn test_execution_times_out_while_polling() {
  let mut config = provider();
  config.execution_timeout_secs = 0;
  config.poll_interval_secs = 60;

  let engine = PipelineEngine::new(
    config,
    // Never becomes ready, so the execution parks in the poll wait.
    FakeCrawl::ready_after(u32::MAX),
    FakeQuery::returning(result_set(true)),
    FakeNotify::default(),
  );

  let err = engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ExecutionError::Timeout { .. }));
}

#[tokio::test]
async fn test_cancellation_stops_the_execution() {
  let notify = FakeNotify::default();
  let engine = PipelineEngine::new(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(result_set(true)),
    notify.clone(),
  );

  let cancel = CancellationToken::new();
  cancel.cancel();
  let err = engine.execute(event(), cancel).await.unwrap_err();

  assert!(matches!(err, ExecutionError::Cancelled));
  assert!(notify.publishes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notifier_observes_event_sequence() {
  let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
  let engine = PipelineEngine::with_notifier(
    provider(),
    FakeCrawl::ready_after(0),
    FakeQuery::returning(result_set(true)),
    FakeNotify::default(),
    ChannelNotifier::new(tx),
  );

  engine
    .execute(event(), CancellationToken::new())
    .await
    .unwrap();

  let mut events = Vec::new();
  while let Ok(event) = rx.try_recv() {
    events.push(event);
  }

  assert!(matches!(
    events.first(),
    Some(ExecutionEvent::ExecutionStarted { .. })
  ));
  assert!(matches!(
    events.last(),
    Some(ExecutionEvent::ExecutionCompleted {
      outcome: Outcome::Succeeded,
      ..
    })
  ));

  let entered: Vec<State> = events
    .iter()
    .filter_map(|event| match event {
      ExecutionEvent::StateEntered { state, .. } => Some(*state),
      _ => None,
    })
    .collect();
  assert_eq!(
    entered,
    vec![
      State::StartCrawl,
      State::GetCrawlStatus,
      State::GetExecutionParameters,
      State::StartQuery,
      State::GetQueryResults,
      State::ProcessResults,
      State::PublishSuccess,
      State::Succeeded,
    ]
  );
}
