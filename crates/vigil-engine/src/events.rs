//! Execution events and notifiers for observability.
//!
//! Events are emitted as an execution advances to allow consumers to observe
//! progress, persist state, stream to UIs, etc. Structured tracing happens
//! independently of these events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vigil_workflow::State;

use crate::report::Outcome;

/// Events emitted during pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// An execution has started for a triggering upload event.
  ExecutionStarted {
    execution_id: String,
    provider_path: String,
    object_key: String,
  },

  /// The execution entered a state.
  StateEntered {
    execution_id: String,
    state: State,
  },

  /// A state's step completed.
  StateCompleted {
    execution_id: String,
    state: State,
  },

  /// The execution reached a terminal state. A `Failed` outcome here is the
  /// validation-failure path, not a system error.
  ExecutionCompleted {
    execution_id: String,
    outcome: Outcome,
  },

  /// The execution terminated abnormally.
  ExecutionFailed {
    execution_id: String,
    error: String,
  },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event - implementations decide what to
/// do with them (persist, broadcast, log, ignore, etc.).
pub trait ExecutionNotifier: Send + Sync {
  /// Called when an execution event occurs.
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
///
/// Useful for tests or when event observation is not needed.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {
    // Intentionally empty
  }
}

/// A notifier that sends events to an unbounded channel.
///
/// Use this when you need to consume events asynchronously (e.g., persist
/// to a database, stream to a UI via websocket, etc.).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // NOTE: Unbounded so the engine never blocks on a slow consumer. Event
  // volume is low (a handful per execution), so memory growth is unlikely
  // in practice.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  /// Create a new channel notifier.
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
