pub mod get;
pub mod list;

use crate::models::Ingredient;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Returns the router for /api/ingredients endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ingredients/", get(list::list_ingredients))
        .route("/api/ingredients/{id}/", get(get::get_ingredient))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_ingredients, get::get_ingredient),
    components(schemas(IngredientResponse))
)]
pub struct ApiDoc;
