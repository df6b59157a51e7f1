pub mod create;
pub mod delete;
pub mod download;
pub mod get;
pub mod link;
pub mod list;
pub mod payload;
pub mod response;
pub mod toggle;
pub mod update;

use crate::api::{ApiError, ErrorResponse};
use crate::models::Recipe;
use crate::schema::recipes;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/recipes/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/api/recipes/download_shopping_cart/",
            get(download::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite/",
            post(toggle::add_favorite).delete(toggle::remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart/",
            post(toggle::add_to_cart).delete(toggle::remove_from_cart),
        )
        .route("/api/recipes/{id}/get-link/", get(link::get_link))
}

/// Load a recipe by id, mapping a missing row to 404.
pub fn find_recipe(conn: &mut PgConnection, id: i32) -> Result<Recipe, ApiError> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to fetch recipe", e))?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        toggle::add_favorite,
        toggle::remove_favorite,
        toggle::add_to_cart,
        toggle::remove_from_cart,
        download::download_shopping_cart,
        link::get_link,
    ),
    components(schemas(
        response::RecipeResponse,
        response::ShortRecipeResponse,
        response::RecipeIngredientResponse,
        payload::RecipePayload,
        payload::IngredientAmountPayload,
        link::ShortLinkResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;
