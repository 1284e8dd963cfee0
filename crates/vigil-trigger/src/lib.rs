//! Vigil Trigger
//!
//! Upload-notification event types and the pattern filter that decides which
//! events start an execution. One event describes one object landing in a
//! storage bucket; a pattern matches events by bucket equality and key
//! prefix.

mod types;

pub use types::{BucketRef, EventPattern, OBJECT_CREATED, ObjectRef, UploadDetail, UploadEvent};
