use super::response::UserResponse;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn get_me(
    AuthUser(user): AuthUser,
    State(config): State<Arc<Config>>,
) -> Json<UserResponse> {
    // Self-subscription is impossible, so this is always false.
    Json(UserResponse::new(&user, false, &config))
}
