use crate::api::{ApiError, ErrorResponse};
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use foodgram_core::validation::validate_password;
use foodgram_core::ValidationErrors;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub current_password: String,
}

fn check_request(req: &SetPasswordRequest, password_hash: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.current_password.is_empty() {
        errors.add("current_password", "This field is required.");
    } else if !verify_password(&req.current_password, password_hash) {
        errors.add("current_password", "Invalid password.");
    }

    if let Err(e) = validate_password(&req.new_password) {
        for message in e.into_fields().into_values().flatten() {
            errors.add("new_password", message);
        }
    }

    errors.into_result()
}

#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    tag = "users",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn set_password(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    check_request(&req, &user.password_hash)?;

    let password_hash = hash_password(&req.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to change password")
    })?;

    let mut conn = get_conn!(pool);

    diesel::update(users::table.find(user.id))
        .set(users::password_hash.eq(&password_hash))
        .execute(&mut conn)
        .map_err(|e| ApiError::database("Failed to change password", e))?;

    tracing::info!(user_id = user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}
