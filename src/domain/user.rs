use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan. Only the free plan enforces usage quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
  #[default]
  Free,
  Quarterly,
  Semiannual,
  Annual,
}

impl Plan {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Free => "free",
      Self::Quarterly => "quarterly",
      Self::Semiannual => "semiannual",
      Self::Annual => "annual",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "free" => Some(Self::Free),
      "quarterly" => Some(Self::Quarterly),
      "semiannual" => Some(Self::Semiannual),
      "annual" => Some(Self::Annual),
      _ => None,
    }
  }

  /// Paid plans have no generation or collection quotas.
  pub fn is_free(&self) -> bool {
    matches!(self, Self::Free)
  }
}

/// User profile as exposed by the API. The password hash never leaves the
/// database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub name: String,
  pub email: String,
  pub photo: Option<String>,
  pub plan: Plan,
  pub generations_left: i64,
  pub collections_left: i64,
  pub created_at: DateTime<Utc>,
}
