use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-limited public handle for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: Uuid,
    pub hash: String,
    pub analysis_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 32 hex chars from a v4 UUID.
pub fn new_share_hash() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn expiry_from(now: DateTime<Utc>, ttl_days: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_days(ttl_days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("share link ttl of {ttl_days} days is out of range"))
}
