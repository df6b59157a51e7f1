use super::find_recipe;
use super::payload::{RecipePayload, ValidRecipe};
use super::response::{load_recipe_response, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Recipe, RecipeChanges, User};
use crate::schema::{images, recipes};
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use foodgram_core::validation::DraftMode;
use std::sync::Arc;

pub const NOT_ALLOWED: &str = "You do not have permission to perform this action.";

/// Authors manage their own recipes; staff may manage any.
pub fn can_modify(user: &User, recipe: &Recipe) -> bool {
    user.is_staff || recipe.author_id == user.id
}

/// Write a validated update in one transaction. A new image belongs to the
/// recipe's author even when staff makes the edit.
fn apply_update(
    conn: &mut PgConnection,
    recipe: Recipe,
    valid: &ValidRecipe<'_>,
) -> Result<Recipe, ApiError> {
    let old_image = recipe.image_id;
    conn.transaction::<Recipe, ApiError, _>(|conn| {
        let image_id = valid.store_image(conn, recipe.author_id)?;

        let changes = RecipeChanges {
            name: valid.name,
            text: valid.text,
            image_id,
            cooking_time: valid.cooking_time,
        };

        let updated = if changes.is_empty() {
            recipe
        } else {
            diesel::update(recipes::table.find(recipe.id))
                .set(&changes)
                .returning(Recipe::as_returning())
                .get_result(conn)
                .map_err(|e| ApiError::database("Failed to update recipe", e))?
        };

        if updated.image_id != old_image {
            diesel::delete(images::table.find(old_image))
                .execute(conn)
                .map_err(|e| ApiError::database("Failed to remove old image", e))?;
        }

        valid
            .write_links(conn, updated.id)
            .map_err(|e| ApiError::database("Failed to save recipe ingredients", e))?;

        Ok(updated)
    })
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipePayload,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, id)?;

    if !can_modify(&user, &recipe) {
        return Err(ApiError::Forbidden(NOT_ALLOWED));
    }

    let valid = payload.validate(DraftMode::Update)?;
    valid.check_references(&mut conn)?;

    let recipe = apply_update(&mut conn, recipe, &valid)?;

    tracing::info!(recipe_id = recipe.id, user_id = user.id, "recipe updated");

    let response = load_recipe_response(&mut conn, Some(user.id), recipe, &config)
        .map_err(|e| ApiError::database("Failed to fetch recipe details", e))?;

    Ok(Json(response))
}
