use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info};
use vigil_services::ResultSet;

/// Input to the normalization step: the fetched result set plus the object
/// key of the triggering upload, for correlation in logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeInput {
  pub result_set: Option<ResultSet>,
  pub object_key: Option<String>,
}

/// Output of the normalization step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResults {
  /// Column name to coerced value. Empty when the input was unusable.
  pub results: Map<String, Value>,
}

#[derive(Debug, Error)]
enum NormalizeError {
  #[error("'{data}' is not a valid {expected}")]
  InvalidValue { data: String, expected: &'static str },

  #[error("column {index} has no metadata")]
  MissingColumnInfo { index: usize },

  #[error("row cell {index} is empty")]
  MissingCell { index: usize },
}

/// Normalize a two-row typed result set into a flat record.
///
/// Any anomaly is recovered locally: it is logged once and the mapping
/// accumulated so far (possibly empty) is returned. This function never
/// fails past its own boundary.
///
/// A result set with more than two rows is rejected wholesale; the first two
/// rows are not processed even when they are present and valid.
pub fn normalize(input: &NormalizeInput) -> NormalizedResults {
  let mut results = Map::new();

  let (Some(result_set), Some(object_key)) = (&input.result_set, &input.object_key) else {
    error!("no object key or result set found in input");
    return NormalizedResults { results };
  };

  info!(object_key = %object_key, "processing query results");

  match result_set.rows.len() {
    2 => {
      if let Err(e) = coerce_rows(result_set, &mut results) {
        error!(object_key = %object_key, error = %e, "failed to coerce result set");
      }
    }
    n if n > 2 => {
      error!("result set should have 2 rows but it has {} rows", n);
    }
    _ => {
      error!("result set is empty or does not have enough rows");
    }
  }

  info!(object_key = %object_key, "finished processing query results");
  NormalizedResults { results }
}

/// Coerce the value row against the label row and column metadata.
///
/// Inserts into `results` as it goes, so the caller keeps the partial
/// mapping when a later field fails to coerce.
fn coerce_rows(
  result_set: &ResultSet,
  results: &mut Map<String, Value>,
) -> Result<(), NormalizeError> {
  let labels = &result_set.rows[0];
  let values = &result_set.rows[1];

  for (index, cell) in values.iter().enumerate() {
    let name = labels
      .get(index)
      .and_then(|label| label.as_deref())
      .ok_or(NormalizeError::MissingCell { index })?;

    let column = result_set
      .columns
      .get(index)
      .ok_or(NormalizeError::MissingColumnInfo { index })?;

    let raw = cell
      .as_deref()
      .ok_or(NormalizeError::MissingCell { index })?;

    let value = convert(raw, &column.data_type)
      .ok_or_else(|| NormalizeError::InvalidValue {
        data: raw.to_string(),
        expected: expected_name(&column.data_type),
      })?;

    results.insert(name.to_string(), value);
  }

  Ok(())
}

fn expected_name(data_type: &str) -> &'static str {
  if data_type == "bigint" { "bigint" } else { "double" }
}

/// Convert one raw cell to its declared column type.
///
/// `bigint` and `double` parse base-10; `boolean` is true only for the exact
/// string `"true"` (so `"True"` and `"1"` are false); any other declared
/// type passes through as a string. Returns `None` when a numeric parse
/// fails.
pub fn convert(data: &str, data_type: &str) -> Option<Value> {
  match data_type {
    "bigint" => data.parse::<i64>().ok().map(|n| Value::Number(n.into())),
    "double" => data
      .parse::<f64>()
      .ok()
      .map(|n| serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)),
    "boolean" => Some(Value::Bool(data == "true")),
    _ => Some(Value::String(data.to_string())),
  }
}
