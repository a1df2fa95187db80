use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homeguide_core::domain::validation::{FieldError, ValidationErrors};
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    Rejected(JsonRejection),
    BadPath(PathRejection),
    Unauthorized,
    NotFound(&'static str),
    Unavailable,
    Internal(anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, fields) = match &self {
            ApiError::Validation(errs) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                errs.to_string(),
                errs.errors().to_vec(),
            ),
            ApiError::Rejected(rejection) => (
                rejection.status(),
                "invalid_body",
                rejection.body_text(),
                Vec::new(),
            ),
            ApiError::BadPath(rejection) => (
                rejection.status(),
                "invalid_path",
                rejection.body_text(),
                Vec::new(),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "caller identity required".to_string(),
                Vec::new(),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{what} not found"),
                Vec::new(),
            ),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "database not available".to_string(),
                Vec::new(),
            ),
            ApiError::Internal(err) => {
                sentry_anyhow::capture_anyhow(err);
                tracing::error!(error = %format!("{err:#}"), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorBody {
            error,
            message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errs: ValidationErrors) -> Self {
        ApiError::Validation(errs)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadPath(rejection)
    }
}
