use super::response::{load_user_responses, UserResponse};
use crate::api::pagination::{check_page, Paginated};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{
    extract::{OriginalUri, Query, State},
    Json,
};
use diesel::prelude::*;
use foodgram_core::{PageParams, PageRequest};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserResponse>),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    )
)]
pub async fn list_users(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    let mut conn = get_conn!(pool);
    let page = PageRequest::from_params(params, config.page_size);

    let total: i64 = users::table
        .count()
        .get_result(&mut conn)
        .map_err(|e| ApiError::database("Failed to count users", e))?;
    check_page(&page, total)?;

    let rows: Vec<User> = users::table
        .order(users::id.asc())
        .limit(page.limit)
        .offset(page.offset())
        .select(User::as_select())
        .load(&mut conn)
        .map_err(|e| ApiError::database("Failed to fetch users", e))?;

    let results = load_user_responses(&mut conn, viewer.id(), &rows, &config)
        .map_err(|e| ApiError::database("Failed to fetch subscriptions", e))?;

    Ok(Json(Paginated::new(
        results,
        total,
        &page,
        &config.public_base_url,
        &uri,
    )))
}
