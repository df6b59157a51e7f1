use crate::api::{ApiError, ErrorResponse};
use crate::auth::{create_session, verify_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub auth_token: String,
}

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[utoipa::path(
    post,
    path = "/api/auth/token/login/",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "cook@example.com", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let user: User = users::table
        .filter(users::email.eq(req.email.trim()))
        .select(User::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to look up user", e))?
        .ok_or_else(|| ApiError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let auth_token = create_session(&mut conn, user.id)
        .map_err(|e| ApiError::database("Failed to create session", e))?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse { auth_token }))
}
