use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;

/// States of the orchestration graph.
///
/// The graph is mostly linear with two choice points: crawl readiness after
/// `GetCrawlStatus`, and the validation verdict after `ProcessResults`.
/// `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
  StartCrawl,
  GetCrawlStatus,
  WaitForCrawl,
  GetExecutionParameters,
  StartQuery,
  GetQueryResults,
  ProcessResults,
  PublishSuccess,
  PublishFail,
  HandleFail,
  Succeeded,
  Failed,
}

impl State {
  /// Entry state of every execution.
  pub const INITIAL: State = State::StartCrawl;

  /// All reachable states, in graph order.
  pub const ALL: [State; 12] = [
    State::StartCrawl,
    State::GetCrawlStatus,
    State::WaitForCrawl,
    State::GetExecutionParameters,
    State::StartQuery,
    State::GetQueryResults,
    State::ProcessResults,
    State::PublishSuccess,
    State::PublishFail,
    State::HandleFail,
    State::Succeeded,
    State::Failed,
  ];

  pub fn is_terminal(&self) -> bool {
    matches!(self, State::Succeeded | State::Failed)
  }

  /// The next state given the accumulated execution context.
  ///
  /// Terminal states return `None`. Both choice points read the context:
  /// crawl readiness from the latest crawler status, the validation verdict
  /// from the normalized results.
  pub fn next(&self, ctx: &ExecutionContext) -> Option<State> {
    match self {
      State::StartCrawl => Some(State::GetCrawlStatus),
      State::GetCrawlStatus => {
        if ctx.crawl_is_running() {
          Some(State::WaitForCrawl)
        } else {
          Some(State::GetExecutionParameters)
        }
      }
      State::WaitForCrawl => Some(State::GetCrawlStatus),
      State::GetExecutionParameters => Some(State::StartQuery),
      State::StartQuery => Some(State::GetQueryResults),
      State::GetQueryResults => Some(State::ProcessResults),
      State::ProcessResults => {
        if ctx.validation_succeeded() {
          Some(State::PublishSuccess)
        } else {
          Some(State::PublishFail)
        }
      }
      State::PublishSuccess => Some(State::Succeeded),
      State::PublishFail => Some(State::HandleFail),
      State::HandleFail => Some(State::Failed),
      State::Succeeded | State::Failed => None,
    }
  }

  /// Static edge list of the graph, with both branches of each choice.
  ///
  /// Used for plan output and reachability checks; `next` is the runtime
  /// transition function.
  pub fn edges() -> &'static [(State, State)] {
    &[
      (State::StartCrawl, State::GetCrawlStatus),
      (State::GetCrawlStatus, State::WaitForCrawl),
      (State::GetCrawlStatus, State::GetExecutionParameters),
      (State::WaitForCrawl, State::GetCrawlStatus),
      (State::GetExecutionParameters, State::StartQuery),
      (State::StartQuery, State::GetQueryResults),
      (State::GetQueryResults, State::ProcessResults),
      (State::ProcessResults, State::PublishSuccess),
      (State::ProcessResults, State::PublishFail),
      (State::PublishSuccess, State::Succeeded),
      (State::PublishFail, State::HandleFail),
      (State::HandleFail, State::Failed),
    ]
  }

  pub fn name(&self) -> &'static str {
    match self {
      State::StartCrawl => "start_crawl",
      State::GetCrawlStatus => "get_crawl_status",
      State::WaitForCrawl => "wait_for_crawl",
      State::GetExecutionParameters => "get_execution_parameters",
      State::StartQuery => "start_query",
      State::GetQueryResults => "get_query_results",
      State::ProcessResults => "process_results",
      State::PublishSuccess => "publish_success",
      State::PublishFail => "publish_fail",
      State::HandleFail => "handle_fail",
      State::Succeeded => "succeeded",
      State::Failed => "failed",
    }
  }
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
