//! Vigil Services
//!
//! This crate defines the interfaces vigil uses to talk to its external
//! collaborators: the crawl service that catalogs uploaded files, the query
//! service that evaluates data quality, and the notification channel that
//! delivers the verdict.
//!
//! Only the request/response shapes live here. Concrete clients (cloud SDKs,
//! fixtures for local runs, fakes for tests) implement the traits in their
//! own crates.

mod client;
mod error;
mod types;

pub use client::{CrawlClient, NotifyClient, QueryClient, StartQueryRequest};
pub use error::ServiceError;
pub use types::{
  ColumnInfo, CrawlState, CrawlerStatus, PublishResponse, QueryExecution, ResultSet,
};
