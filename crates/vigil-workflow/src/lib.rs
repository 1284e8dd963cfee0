//! Vigil Workflow
//!
//! The orchestration state machine for one pipeline execution, plus the
//! results document threaded between its steps.
//!
//! The graph is deliberately modeled as a tagged-variant [`State`] enum with
//! an explicit transition function rather than nested conditionals, so the
//! reachable-state set stays enumerable and the two choice points (crawl
//! readiness, validation verdict) can be tested in isolation from any
//! service calls.

mod context;
mod fault;
mod state;

pub use context::{ExecutionContext, NotifyResult, QueryResults, Results};
pub use fault::{Fault, INVALID_CONTENT_PROVIDER_FILE_ERROR};
pub use state::State;
