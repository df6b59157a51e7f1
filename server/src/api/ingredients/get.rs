use super::IngredientResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    tag = "ingredients",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let ingredient: Ingredient = ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to fetch ingredient", e))?
        .ok_or_else(|| ApiError::not_found("Ingredient not found"))?;

    Ok(Json(ingredient.into()))
}
