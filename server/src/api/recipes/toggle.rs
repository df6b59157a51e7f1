//! Favorite and shopping-cart toggles. Both follow the same rules: adding an
//! existing pair or removing a missing one is a 400, an unknown recipe is a 404.

use super::find_recipe;
use super::response::ShortRecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::store::PgRelationStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{relations, RelationKind};
use std::sync::Arc;

async fn add(
    kind: RelationKind,
    user_id: i32,
    pool: &DbPool,
    config: &Config,
    recipe_id: i32,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, recipe_id)?;

    relations::add(
        &mut PgRelationStore::new(&mut conn),
        kind,
        user_id,
        recipe.id,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::new(&recipe, config)),
    ))
}

async fn remove(
    kind: RelationKind,
    user_id: i32,
    pool: &DbPool,
    recipe_id: i32,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, recipe_id)?;

    relations::remove(
        &mut PgRelationStore::new(&mut conn),
        kind,
        user_id,
        recipe.id,
    )?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added to favorites", body = ShortRecipeResponse),
        (status = 400, description = "Already in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), ApiError> {
    add(RelationKind::Favorite, user.id, &pool, &config, id).await
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Not in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove(RelationKind::Favorite, user.id, &pool, id).await
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added to the shopping cart", body = ShortRecipeResponse),
        (status = 400, description = "Already in the shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), ApiError> {
    add(RelationKind::Cart, user.id, &pool, &config, id).await
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 400, description = "Not in the shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove(RelationKind::Cart, user.id, &pool, id).await
}
