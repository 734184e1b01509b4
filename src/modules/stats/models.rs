use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One recorded API usage sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub id: String,
    /// Request path the sample describes, e.g. `/api/v1/books`
    pub endpoint: String,
    /// HTTP verb
    pub method: String,
    /// Status code as reported by the caller; any integer is kept as-is
    pub status: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Request body for recording a sample; `id` and `timestamp` are server-assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateStats {
    pub endpoint: String,
    pub method: String,
    pub status: i64,
}
