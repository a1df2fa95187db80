use crate::app::{AppState, Caller};
use crate::error::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Datelike;
use homeguide_core::domain::property::{validate_listing_url, NewProperty, ParsedProperty, Property};
use homeguide_core::storage::properties;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ParseUrlRequest {
    url: String,
}

pub async fn parse_url(
    State(state): State<AppState>,
    payload: Result<Json<ParseUrlRequest>, JsonRejection>,
) -> Result<Json<ParsedProperty>, ApiError> {
    let Json(req) = payload?;
    let url = validate_listing_url(&req.url)?;

    tracing::info!(%url, configured = state.extractor.is_configured(), "parsing listing url");
    let parsed = state.extractor.parse_url(&url).await;
    Ok(Json(parsed))
}

pub async fn create_property(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewProperty>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let Json(input) = payload?;
    input.validate(chrono::Utc::now().year())?;

    let pool = state.pool()?;
    let property = properties::insert_property(pool, &input, caller.0.as_deref()).await?;

    tracing::info!(property_id = %property.id, owner = ?property.user_id, "property created");
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn get_property(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Property>, ApiError> {
    let Path(id) = path?;
    let pool = state.pool()?;
    let property = properties::fetch_property(pool, id)
        .await?
        .ok_or(ApiError::NotFound("property"))?;
    Ok(Json(property))
}

pub async fn list_my_properties(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Property>>, ApiError> {
    let user_id = caller.require()?;
    let pool = state.pool()?;
    let list = properties::list_properties_for_user(pool, &user_id).await?;
    Ok(Json(list))
}
