use super::TagResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    tag = "tags",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn get_tag(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let tag: Tag = tags::table
        .find(id)
        .select(Tag::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to fetch tag", e))?
        .ok_or_else(|| ApiError::not_found("Tag not found"))?;

    Ok(Json(tag.into()))
}
