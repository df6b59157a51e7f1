use super::IngredientResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[utoipa::path(
    get,
    path = "/api/ingredients/",
    tag = "ingredients",
    params(IngredientQuery),
    responses(
        (status = 200, description = "Ingredients ordered by name", body = Vec<IngredientResponse>),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    let mut db_query = ingredients::table
        .select(Ingredient::as_select())
        .order(ingredients::name.asc())
        .into_boxed();

    if let Some(name) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        db_query = db_query.filter(ingredients::name.ilike(like_prefix(name)));
    }

    let rows: Vec<Ingredient> = db_query
        .load(&mut conn)
        .map_err(|e| ApiError::database("Failed to fetch ingredients", e))?;

    Ok(Json(rows.into_iter().map(IngredientResponse::from).collect()))
}
