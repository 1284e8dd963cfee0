use serde::{Deserialize, Serialize};

/// Per-provider notification configuration.
///
/// The message body is a minijinja template rendered against the normalized
/// query results, so each provider decides which result fields its
/// notification mentions. Subscription lists are configuration data only;
/// vigil never provisions the subscriptions itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
  /// Message body template, e.g.
  /// `"{{ file_name }} scored {{ score }} on {{ rows_checked }} rows."`
  pub message: String,
  /// Topic to publish to when validation succeeds.
  pub success_topic: String,
  /// Topic to publish to when validation fails.
  pub fail_topic: String,
  #[serde(default)]
  pub success_subscriptions: Vec<String>,
  #[serde(default)]
  pub fail_subscriptions: Vec<String>,
}
