//! Vigil Engine
//!
//! This crate provides the [`PipelineEngine`] which drives one data-quality
//! execution per triggering upload event:
//! - starts the crawl and polls until the crawler is idle
//! - runs the quality query (the only retried step) and fetches its results
//! - normalizes the result set and branches on the validation verdict
//! - publishes the success or failure notification
//!
//! The engine is generic over its service clients and over an
//! [`ExecutionNotifier`] for observing execution events. Each execution is a
//! single logical task; concurrent executions are fully independent.

mod engine;
mod error;
mod events;
mod message;
mod report;
mod retry;

pub use engine::PipelineEngine;
pub use error::ExecutionError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use message::render_message;
pub use report::{ExecutionReport, Outcome};
pub use retry::with_retry;
