use serde::{Deserialize, Serialize};

/// State reported by the crawl service for a crawler.
///
/// The poll loop only cares about one distinction: still running, or idle and
/// safe to query against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrawlState {
  Running,
  Ready,
}

/// Snapshot of a crawler returned by [`CrawlClient::get_status`].
///
/// [`CrawlClient::get_status`]: crate::CrawlClient::get_status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlerStatus {
  pub state: CrawlState,
  /// Name of the crawler resource.
  pub name: String,
  /// Catalog database the crawler registers schemas into.
  pub database: String,
  /// Storage path the crawler scans.
  pub target_path: String,
}

/// Identifiers assigned when a query run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExecution {
  pub query_execution_id: String,
  /// Location where the query service stored the raw results.
  pub output_location: String,
}

/// Metadata for one result set column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
  pub name: String,
  /// Declared type as reported by the query service (e.g. "bigint", "double").
  #[serde(rename = "type")]
  pub data_type: String,
}

/// Typed tabular output of a catalog query.
///
/// Cells arrive as strings regardless of the declared column type; a missing
/// cell is `None`. The quality queries vigil runs produce two rows: row 0
/// carries the column-name labels, row 1 the values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
  pub columns: Vec<ColumnInfo>,
  pub rows: Vec<Vec<Option<String>>>,
}

/// Response from a notification publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
  pub status_code: u16,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_crawl_state_serde() {
    let json = serde_json::to_string(&CrawlState::Running).unwrap();
    assert_eq!(json, "\"RUNNING\"");

    let state: CrawlState = serde_json::from_str("\"READY\"").unwrap();
    assert_eq!(state, CrawlState::Ready);
  }

  #[test]
  fn test_result_set_column_type_rename() {
    let json = serde_json::json!({
      "columns": [{ "name": "success", "type": "boolean" }],
      "rows": [[ "success" ], [ "true" ]]
    });

    let result_set: ResultSet = serde_json::from_value(json).unwrap();
    assert_eq!(result_set.columns[0].data_type, "boolean");
    assert_eq!(result_set.rows[1][0].as_deref(), Some("true"));
  }
}
