use super::find_recipe;
use super::update::{can_modify, NOT_ALLOWED};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{images, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, id)?;

    if !can_modify(&user, &recipe) {
        return Err(ApiError::Forbidden(NOT_ALLOWED));
    }

    // Ingredient lines, tag links, favorites and cart rows cascade.
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(recipes::table.find(recipe.id)).execute(conn)?;
        diesel::delete(images::table.find(recipe.image_id)).execute(conn)?;
        Ok(())
    })
    .map_err(|e| ApiError::database("Failed to delete recipe", e))?;

    tracing::info!(recipe_id = recipe.id, user_id = user.id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
