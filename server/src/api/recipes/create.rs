use super::payload::RecipePayload;
use super::response::{load_recipe_response, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use foodgram_core::validation::DraftMode;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipes/",
    tag = "recipes",
    request_body = RecipePayload,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let valid = payload.validate(DraftMode::Create)?;

    let mut conn = get_conn!(pool);
    valid.check_references(&mut conn)?;

    let recipe = conn.transaction::<Recipe, ApiError, _>(|conn| {
        let image_id = valid
            .store_image(conn, user.id)?
            .ok_or_else(|| ApiError::field("image", "This field is required."))?;

        let new_recipe = NewRecipe {
            author_id: user.id,
            name: valid.name.unwrap_or_default(),
            text: valid.text.unwrap_or_default(),
            image_id,
            cooking_time: valid.cooking_time.unwrap_or(1),
        };

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)
            .map_err(|e| ApiError::database("Failed to create recipe", e))?;

        valid
            .write_links(conn, recipe.id)
            .map_err(|e| ApiError::database("Failed to save recipe ingredients", e))?;

        Ok(recipe)
    })?;

    tracing::info!(recipe_id = recipe.id, author_id = user.id, "recipe created");

    let response = load_recipe_response(&mut conn, Some(user.id), recipe, &config)
        .map_err(|e| ApiError::database("Failed to fetch recipe details", e))?;

    Ok((StatusCode::CREATED, Json(response)))
}
