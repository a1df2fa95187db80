use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use homeguide_core::domain::analysis::AnalysisWithProperty;
use homeguide_core::domain::share::ShareLink;
use homeguide_core::storage::{analyses, share_links};
use uuid::Uuid;

pub async fn create_share_link(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<(StatusCode, Json<ShareLink>), ApiError> {
    let Path(analysis_id) = path?;
    let pool = state.pool()?;
    let link = share_links::create_share_link(pool, analysis_id, state.share_link_ttl_days)
        .await?
        .ok_or(ApiError::NotFound("analysis"))?;

    tracing::info!(%analysis_id, expires_at = %link.expires_at, "share link created");
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn resolve_share_link(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<AnalysisWithProperty>, ApiError> {
    let Path(hash) = path?;
    let pool = state.pool()?;
    let link = share_links::resolve_share_link(pool, &hash)
        .await?
        .ok_or(ApiError::NotFound("share link"))?;

    let analysis = analyses::fetch_analysis_with_property(pool, link.analysis_id)
        .await?
        .ok_or(ApiError::NotFound("analysis"))?;
    Ok(Json(analysis))
}
