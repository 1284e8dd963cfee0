//! Notification message rendering using minijinja templates.
//!
//! Each provider configures a message body template that is rendered against
//! the normalized result record, so the template decides which result fields
//! the notification mentions:
//!
//! ```text
//! File {{ file_name }} scored {{ score }} on {{ rows_checked }} rows.
//! ```

use minijinja::Environment;
use serde_json::{Map, Value};

use crate::error::ExecutionError;

/// Render the notification body template against the normalized results.
///
/// An absent record renders against an empty context; templates that
/// reference missing fields render them as minijinja's undefined value
/// rather than failing, which keeps the failure-path notification working
/// when normalization degraded to an empty mapping.
pub fn render_message(
  template: &str,
  normalized: Option<&Map<String, Value>>,
) -> Result<String, ExecutionError> {
  let env = Environment::new();

  let context = normalized
    .cloned()
    .map(Value::Object)
    .unwrap_or_else(|| Value::Object(Map::new()));

  env
    .render_str(template, minijinja::Value::from_serialize(&context))
    .map_err(|e| ExecutionError::Template {
      message: e.to_string(),
    })
}
