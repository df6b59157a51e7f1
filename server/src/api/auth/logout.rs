use crate::api::{ApiError, ErrorResponse};
use crate::auth::{delete_session, AuthToken};
use crate::db::DbPool;
use crate::get_conn;
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    tag = "auth",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn logout(
    auth: AuthToken,
    State(pool): State<Arc<DbPool>>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    delete_session(&mut conn, &auth.token)
        .map_err(|e| ApiError::database("Failed to delete session", e))?;

    tracing::info!(user_id = auth.user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
