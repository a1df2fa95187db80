use crate::domain::share::{expiry_from, new_share_hash, ShareLink};
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

type ShareLinkRow = (Uuid, String, Uuid, DateTime<Utc>, DateTime<Utc>);

fn from_row((id, hash, analysis_id, expires_at, created_at): ShareLinkRow) -> ShareLink {
    ShareLink {
        id,
        hash,
        analysis_id,
        expires_at,
        created_at,
    }
}

/// `None` when the analysis does not exist.
pub async fn create_share_link(
    pool: &sqlx::PgPool,
    analysis_id: Uuid,
    ttl_days: i64,
) -> anyhow::Result<Option<ShareLink>> {
    let hash = new_share_hash();
    let expires_at = expiry_from(Utc::now(), ttl_days)?;

    let row: Option<ShareLinkRow> = sqlx::query_as(
        "INSERT INTO share_links (hash, analysis_id, expires_at) \
         SELECT $1, $2, $3 \
         WHERE EXISTS (SELECT 1 FROM analyses WHERE id = $2) \
         RETURNING id, hash, analysis_id, expires_at, created_at",
    )
    .bind(&hash)
    .bind(analysis_id)
    .bind(expires_at)
    .fetch_optional(pool)
    .await
    .context("insert share_links failed")?;

    Ok(row.map(from_row))
}

/// Unexpired link for `hash`, if any.
pub async fn resolve_share_link(
    pool: &sqlx::PgPool,
    hash: &str,
) -> anyhow::Result<Option<ShareLink>> {
    let row: Option<ShareLinkRow> = sqlx::query_as(
        "SELECT id, hash, analysis_id, expires_at, created_at \
         FROM share_links \
         WHERE hash = $1 AND expires_at > now() \
         LIMIT 1",
    )
    .bind(hash)
    .fetch_optional(pool)
    .await
    .context("select share_links by hash failed")?;

    Ok(row.map(from_row))
}
