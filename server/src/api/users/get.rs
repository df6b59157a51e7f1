use super::response::{load_user_responses, UserResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

/// Load a user by id, mapping a missing row to 404.
pub fn find_user(conn: &mut PgConnection, id: i32) -> Result<User, ApiError> {
    users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to fetch user", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = get_conn!(pool);
    let user = find_user(&mut conn, id)?;

    let mut responses = load_user_responses(&mut conn, viewer.id(), std::slice::from_ref(&user), &config)
        .map_err(|e| ApiError::database("Failed to fetch subscriptions", e))?;

    responses
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to build user response"))
}
