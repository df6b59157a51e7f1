use super::find_recipe;
use super::response::{load_recipe_response, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, id)?;

    let response = load_recipe_response(&mut conn, viewer.id(), recipe, &config)
        .map_err(|e| ApiError::database("Failed to fetch recipe details", e))?;

    Ok(Json(response))
}
