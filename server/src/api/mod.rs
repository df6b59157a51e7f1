pub mod auth;
pub mod ingredients;
pub mod media;
pub mod pagination;
pub mod recipes;
pub mod short_links;
pub mod tags;
pub mod users;

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use foodgram_core::{ImageError, RelationError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Per-field messages, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }
}

/// Error type returned by handlers; converts into a JSON `ErrorResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        ApiError::Validation(errors)
    }

    /// Log a database failure and hide its details from the client.
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::Internal(context.to_string())
    }

    pub fn from_image(field: &str, err: ImageError) -> Self {
        ApiError::field(field, err.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                error: "Validation failed".to_string(),
                fields: Some(errors.into_fields()),
            },
            other => ErrorResponse::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::database("Database error", err)
    }
}

/// Duplicate adds and removes of missing relations are client errors (400).
impl From<RelationError> for ApiError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::Conflict(message) | RelationError::NotFound(message) => {
                ApiError::BadRequest(message.to_string())
            }
            RelationError::Store(e) => ApiError::database("Failed to update relation", e),
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Foodgram API", description = "Recipes, favorites, shopping cart and subscriptions"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "token_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token <auth_token>",
            ))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        auth::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        short_links::ApiDoc::openapi(),
        media::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_errors_are_bad_requests() {
        let err: ApiError = RelationError::Conflict("Recipe is already in favorites").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Recipe is already in favorites");

        let err: ApiError = RelationError::NotFound("Not subscribed to this user").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_errors_are_internal() {
        let err: ApiError =
            RelationError::Store(foodgram_core::StoreError::Backend("boom".to_string())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("boom"));
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let err = ApiError::field("tags", "This field is required.");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_openapi_contains_core_paths() {
        let spec = openapi();
        for path in [
            "/api/recipes/{id}/favorite/",
            "/api/recipes/{id}/shopping_cart/",
            "/api/recipes/download_shopping_cart/",
            "/api/recipes/{id}/get-link/",
            "/api/users/{id}/subscribe/",
            "/s/{token}/",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
