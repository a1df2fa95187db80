use crate::error::ApiError;
use crate::routes::{analysis, property, share};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::Router;
use homeguide_core::domain::analysis::ScenarioPolicy;
use homeguide_core::extract::ListingExtractor;
use sqlx::PgPool;
use std::convert::Infallible;
use tower_http::trace::TraceLayer;

/// Set by the auth proxy in front of the API.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub extractor: ListingExtractor,
    pub policy: ScenarioPolicy,
    pub share_link_ttl_days: i64,
}

impl AppState {
    pub fn pool(&self) -> Result<&PgPool, ApiError> {
        self.pool.as_ref().ok_or(ApiError::Unavailable)
    }
}

/// Caller id forwarded by the auth layer; `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<String>);

impl Caller {
    pub fn require(self) -> Result<String, ApiError> {
        self.0.ok_or(ApiError::Unauthorized)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Caller(id))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/property/parse-url", post(property::parse_url))
        .route("/properties", post(property::create_property))
        .route("/properties/:id", get(property::get_property))
        .route("/me/properties", get(property::list_my_properties))
        .route("/analyses", post(analysis::create_analysis))
        .route("/analyses/:id", get(analysis::get_analysis))
        .route("/analyses/:id/share", post(share::create_share_link))
        .route("/share/:hash", get(share::resolve_share_link))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}
