use super::TagResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
use axum::{extract::State, Json};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags/",
    tag = "tags",
    responses(
        (status = 200, description = "All tags, ordered by name", body = Vec<TagResponse>),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_tags(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    let tags: Vec<Tag> = tags::table
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(&mut conn)
        .map_err(|e| ApiError::database("Failed to fetch tags", e))?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}
