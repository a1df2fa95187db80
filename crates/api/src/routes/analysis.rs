use crate::app::{AppState, Caller};
use crate::error::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use homeguide_core::domain::analysis::{Analysis, AnalysisDraft, AnalysisWithProperty, NewAnalysis};
use homeguide_core::storage::analyses;
use uuid::Uuid;

pub async fn create_analysis(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewAnalysis>, JsonRejection>,
) -> Result<(StatusCode, Json<Analysis>), ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let pool = state.pool()?;
    let draft = AnalysisDraft::generate(input, caller.0, &state.policy);
    let analysis = analyses::insert_analysis(pool, &draft)
        .await?
        .ok_or(ApiError::NotFound("property"))?;

    tracing::info!(
        analysis_id = %analysis.id,
        property_id = %analysis.property_id,
        scenarios = analysis.scenarios.len(),
        "analysis created"
    );
    Ok((StatusCode::CREATED, Json(analysis)))
}

pub async fn get_analysis(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AnalysisWithProperty>, ApiError> {
    let Path(id) = path?;
    let pool = state.pool()?;
    let analysis = analyses::fetch_analysis_with_property(pool, id)
        .await?
        .ok_or(ApiError::NotFound("analysis"))?;
    Ok(Json(analysis))
}
