use super::response::{load_subscription_responses, recipes_limit, SubscriptionUserResponse};
use crate::api::pagination::{check_page, Paginated};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::{subscriptions, users};
use axum::{
    extract::{OriginalUri, Query, State},
    Json,
};
use diesel::prelude::*;
use foodgram_core::{PageParams, PageRequest};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("recipes_limit" = Option<i64>, Query, description = "Recipes shown per author (default 10)")
    ),
    responses(
        (status = 200, description = "Followed authors", body = Paginated<SubscriptionUserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<Paginated<SubscriptionUserResponse>>, ApiError> {
    let mut conn = get_conn!(pool);
    let page = PageRequest::from_params(
        PageParams {
            page: query.page,
            limit: query.limit,
        },
        config.page_size,
    );

    let total: i64 = subscriptions::table
        .filter(subscriptions::user_id.eq(user.id))
        .count()
        .get_result(&mut conn)
        .map_err(|e| ApiError::database("Failed to count subscriptions", e))?;
    check_page(&page, total)?;

    let authors: Vec<User> = subscriptions::table
        .inner_join(users::table.on(users::id.eq(subscriptions::author_id)))
        .filter(subscriptions::user_id.eq(user.id))
        .order(users::username.asc())
        .limit(page.limit)
        .offset(page.offset())
        .select(User::as_select())
        .load(&mut conn)
        .map_err(|e| ApiError::database("Failed to fetch subscriptions", e))?;

    let results = load_subscription_responses(
        &mut conn,
        &authors,
        recipes_limit(query.recipes_limit),
        &config,
    )
    .map_err(|e| ApiError::database("Failed to fetch subscribed authors' recipes", e))?;

    Ok(Json(Paginated::new(
        results,
        total,
        &page,
        &config.public_base_url,
        &uri,
    )))
}
