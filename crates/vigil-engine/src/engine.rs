//! Pipeline engine implementation.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use vigil_config::ProviderConfig;
use vigil_normalize::{NormalizeInput, normalize};
use vigil_services::{CrawlClient, NotifyClient, QueryClient, StartQueryRequest};
use vigil_trigger::UploadEvent;
use vigil_workflow::{ExecutionContext, Fault, NotifyResult, QueryResults, State};

use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::message::render_message;
use crate::report::{ExecutionReport, Outcome};
use crate::retry::with_retry;

/// The pipeline engine.
///
/// Owns one provider's configuration and clients for the external services,
/// and drives the orchestration state machine for each triggering upload
/// event. Steps execute strictly in graph order within one execution; the
/// engine holds no mutable state of its own, so one engine can serve many
/// concurrent executions.
///
/// Generic over `N: ExecutionNotifier` to allow different event observation
/// strategies. Use `PipelineEngine::new()` for no-op notifications, or
/// `PipelineEngine::with_notifier()` to provide a custom notifier.
pub struct PipelineEngine<C, Q, P, N = NoopNotifier> {
  provider: ProviderConfig,
  crawl: C,
  query: Q,
  notify: P,
  notifier: N,
}

impl<C, Q, P> PipelineEngine<C, Q, P, NoopNotifier>
where
  C: CrawlClient,
  Q: QueryClient,
  P: NotifyClient,
{
  /// Create a new engine with no-op event notifications.
  pub fn new(provider: ProviderConfig, crawl: C, query: Q, notify: P) -> Self {
    Self::with_notifier(provider, crawl, query, notify, NoopNotifier)
  }
}

impl<C, Q, P, N> PipelineEngine<C, Q, P, N>
where
  C: CrawlClient,
  Q: QueryClient,
  P: NotifyClient,
  N: ExecutionNotifier,
{
  /// Create a new engine with a custom event notifier.
  pub fn with_notifier(provider: ProviderConfig, crawl: C, query: Q, notify: P, notifier: N) -> Self {
    Self {
      provider,
      crawl,
      query,
      notify,
      notifier,
    }
  }

  /// Get a reference to the provider configuration.
  pub fn provider(&self) -> &ProviderConfig {
    &self.provider
  }

  /// Run one execution for a triggering upload event.
  ///
  /// Returns `Ok` when the state machine reached a terminal state - note
  /// that a `Failed` outcome with an attached fault is the expected
  /// validation-failure result, not an error. `Err` means the execution
  /// terminated abnormally: a hard service failure, the overall timeout, or
  /// cancellation.
  #[instrument(
    name = "pipeline_execute",
    skip(self, event, cancel),
    fields(provider_path = %self.provider.provider_path)
  )]
  pub async fn execute(
    &self,
    event: UploadEvent,
    cancel: CancellationToken,
  ) -> Result<ExecutionReport, ExecutionError> {
    let execution_id = uuid::Uuid::new_v4().to_string();

    info!(
      execution_id = %execution_id,
      bucket = %event.bucket_name(),
      object_key = %event.object_key(),
      "execution_started"
    );
    self.notifier.notify(ExecutionEvent::ExecutionStarted {
      execution_id: execution_id.clone(),
      provider_path: self.provider.provider_path.clone(),
      object_key: event.object_key().to_string(),
    });

    let mut ctx = ExecutionContext::new(execution_id.clone(), event);

    // The overall wall-clock budget covers the whole graph, poll waits
    // included. Exceeding it is a hard failure, distinct from the
    // validation-failure path.
    let result = match tokio::time::timeout(
      self.provider.execution_timeout(),
      self.run_to_completion(&mut ctx, &cancel),
    )
    .await
    {
      Ok(result) => result,
      Err(_) => Err(ExecutionError::Timeout {
        execution_id: execution_id.clone(),
      }),
    };

    match result {
      Ok(outcome) => {
        info!(
          execution_id = %execution_id,
          outcome = ?outcome,
          "execution_completed"
        );
        self.notifier.notify(ExecutionEvent::ExecutionCompleted {
          execution_id: execution_id.clone(),
          outcome,
        });
        Ok(ExecutionReport {
          execution_id,
          outcome,
          results: ctx.results,
        })
      }
      Err(e) => {
        error!(
          execution_id = %execution_id,
          error = %e,
          "execution_failed"
        );
        self.notifier.notify(ExecutionEvent::ExecutionFailed {
          execution_id,
          error: e.to_string(),
        });
        Err(e)
      }
    }
  }

  /// Drive the state machine from its initial state to a terminal state.
  async fn run_to_completion(
    &self,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
  ) -> Result<Outcome, ExecutionError> {
    let mut state = State::INITIAL;

    loop {
      if cancel.is_cancelled() {
        warn!(execution_id = %ctx.execution_id, "execution cancelled");
        return Err(ExecutionError::Cancelled);
      }

      self.notifier.notify(ExecutionEvent::StateEntered {
        execution_id: ctx.execution_id.clone(),
        state,
      });

      self.run_state(state, ctx, cancel).await?;

      info!(
        execution_id = %ctx.execution_id,
        state = %state,
        "state_completed"
      );
      self.notifier.notify(ExecutionEvent::StateCompleted {
        execution_id: ctx.execution_id.clone(),
        state,
      });

      match state.next(ctx) {
        Some(next) => state = next,
        None => break,
      }
    }

    Ok(match state {
      State::Succeeded => Outcome::Succeeded,
      _ => Outcome::Failed,
    })
  }

  /// Execute the side effect of one state.
  async fn run_state(
    &self,
    state: State,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
  ) -> Result<(), ExecutionError> {
    match state {
      State::StartCrawl => self.start_crawl().await,
      State::GetCrawlStatus => self.get_crawl_status(ctx).await,
      State::WaitForCrawl => self.wait_for_crawl(cancel).await,
      State::GetExecutionParameters => self.get_execution_parameters(ctx),
      State::StartQuery => self.start_query(ctx).await,
      State::GetQueryResults => self.get_query_results(ctx).await,
      State::ProcessResults => self.process_results(ctx),
      State::PublishSuccess => {
        self
          .publish(ctx, "succeeded", &self.provider.notify.success_topic)
          .await
      }
      State::PublishFail => {
        self
          .publish(ctx, "failed", &self.provider.notify.fail_topic)
          .await
      }
      State::HandleFail => self.handle_fail(ctx),
      State::Succeeded | State::Failed => Ok(()),
    }
  }

  async fn start_crawl(&self) -> Result<(), ExecutionError> {
    self
      .crawl
      .start_crawl(&self.provider.crawler_name)
      .await
      .map_err(|source| ExecutionError::Crawl { source })
  }

  async fn get_crawl_status(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    let status = self
      .crawl
      .get_status(&self.provider.crawler_name)
      .await
      .map_err(|source| ExecutionError::Crawl { source })?;

    ctx.results.crawl = Some(status);
    Ok(())
  }

  async fn wait_for_crawl(&self, cancel: &CancellationToken) -> Result<(), ExecutionError> {
    tokio::select! {
      _ = tokio::time::sleep(self.provider.poll_interval()) => Ok(()),
      _ = cancel.cancelled() => Err(ExecutionError::Cancelled),
    }
  }

  fn get_execution_parameters(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    let parameter =
      ctx
        .event
        .execution_parameter()
        .ok_or_else(|| ExecutionError::InvalidObjectKey {
          key: ctx.event.object_key().to_string(),
        })?;

    ctx.results.query = Some(QueryResults {
      execution_parameters: vec![parameter.to_string()],
      ..QueryResults::default()
    });
    Ok(())
  }

  async fn start_query(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    let parameters = ctx
      .results
      .query
      .as_ref()
      .map(|q| q.execution_parameters.clone())
      .ok_or(ExecutionError::MissingStepOutput {
        state: State::StartQuery,
        field: "execution_parameters",
      })?;

    let query = self.provider.resolved_query();

    // The only retried step in the pipeline: transient query-service errors
    // are retried per the provider's policy, everything else fails hard.
    let execution = with_retry(&self.provider.retry, || {
      self.query.start_query(StartQueryRequest {
        query: &query,
        execution_parameters: &parameters,
        database: &self.provider.database_name,
        workgroup: &self.provider.workgroup,
      })
    })
    .await
    .map_err(|source| ExecutionError::Query { source })?;

    if let Some(results) = ctx.results.query.as_mut() {
      results.execution = Some(execution);
    }
    Ok(())
  }

  async fn get_query_results(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    let execution_id = ctx
      .results
      .query
      .as_ref()
      .and_then(|q| q.execution.as_ref())
      .map(|e| e.query_execution_id.clone())
      .ok_or(ExecutionError::MissingStepOutput {
        state: State::GetQueryResults,
        field: "query_execution_id",
      })?;

    let result_set = self
      .query
      .fetch_results(&execution_id)
      .await
      .map_err(|source| ExecutionError::QueryResults { source })?;

    if let Some(results) = ctx.results.query.as_mut() {
      results.result_set = Some(result_set);
    }
    Ok(())
  }

  fn process_results(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    let input = NormalizeInput {
      result_set: ctx
        .results
        .query
        .as_ref()
        .and_then(|q| q.result_set.clone()),
      object_key: Some(ctx.event.object_key().to_string()),
    };

    // Normalization recovers its own anomalies: a malformed result set
    // degrades to an empty mapping, which routes the execution to the
    // failure branch through the evaluation gate.
    let normalized = normalize(&input);
    ctx.results.normalized = Some(normalized.results);
    Ok(())
  }

  async fn publish(
    &self,
    ctx: &mut ExecutionContext,
    verdict: &str,
    topic: &str,
  ) -> Result<(), ExecutionError> {
    let subject = format!(
      "Data quality monitoring job for {} {}.",
      self.provider.provider_path, verdict
    );
    let message = render_message(
      &self.provider.notify.message,
      ctx.results.normalized.as_ref(),
    )?;

    let response = self
      .notify
      .publish(topic, &subject, &message)
      .await
      .map_err(|source| ExecutionError::Publish { source })?;

    ctx.results.notify = Some(NotifyResult {
      status_code: response.status_code,
      subject,
    });
    Ok(())
  }

  fn handle_fail(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
    ctx.results.error = Some(Fault::invalid_content_provider_file());
    Ok(())
  }
}
