//! Vigil Config
//!
//! This crate contains the serializable configuration types for vigil
//! pipelines. One [`ProviderConfig`] describes everything a logical content
//! provider needs: where its files land, which crawler and catalog database
//! cover them, the quality query to run, and how to notify on the outcome.
//!
//! Configuration is loaded from JSON files, one per provider. Timing knobs
//! (poll interval, retry policy, overall timeout) are named fields with
//! defaults rather than literals buried in the engine, so they can be tuned
//! per provider and tightened in tests.

mod error;
mod notify;
mod provider;
mod retry;

pub use error::ConfigError;
pub use notify::NotifyConfig;
pub use provider::{
  DEFAULT_EXECUTION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, ProviderConfig,
};
pub use retry::{RetryBackoff, RetryPolicy};
