use super::get::find_user;
use super::response::{load_subscription_responses, recipes_limit, SubscriptionUserResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::store::PgRelationStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{relations, RelationKind};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID"),
        ("recipes_limit" = Option<i64>, Query, description = "Recipes shown (default 10)")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionUserResponse),
        (status = 400, description = "Already subscribed or subscribing to yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
    Query(query): Query<SubscribeQuery>,
) -> Result<(StatusCode, Json<SubscriptionUserResponse>), ApiError> {
    let mut conn = get_conn!(pool);
    let author = find_user(&mut conn, id)?;

    relations::add(
        &mut PgRelationStore::new(&mut conn),
        RelationKind::Subscription,
        user.id,
        author.id,
    )?;

    let response = load_subscription_responses(
        &mut conn,
        std::slice::from_ref(&author),
        recipes_limit(query.recipes_limit),
        &config,
    )
    .map_err(|e| ApiError::database("Failed to fetch author's recipes", e))?
    .pop()
    .ok_or_else(|| ApiError::internal("Failed to build subscription response"))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);
    let author = find_user(&mut conn, id)?;

    relations::remove(
        &mut PgRelationStore::new(&mut conn),
        RelationKind::Subscription,
        user.id,
        author.id,
    )?;

    Ok(StatusCode::NO_CONTENT)
}
