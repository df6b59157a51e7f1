use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewImage;
use crate::schema::images;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use diesel::prelude::*;
use foodgram_core::decode_data_uri;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::AppState;

/// Returns the router for /media endpoints
pub fn router() -> Router<AppState> {
    Router::new().route("/media/{id}", get(get_media))
}

#[derive(OpenApi)]
#[openapi(paths(get_media))]
pub struct ApiDoc;

/// Decode a base64 data URI and store it as an image owned by `user_id`.
/// Decoding failures are reported against `field`.
pub fn store_image(
    conn: &mut PgConnection,
    user_id: i32,
    field: &str,
    payload: &str,
) -> Result<Uuid, ApiError> {
    let image = decode_data_uri(payload).map_err(|e| ApiError::from_image(field, e))?;

    let new_image = NewImage {
        user_id,
        content_type: &image.content_type,
        data: &image.data,
    };

    let id: Uuid = diesel::insert_into(images::table)
        .values(&new_image)
        .returning(images::id)
        .get_result(conn)
        .map_err(|e| ApiError::database("Failed to store image", e))?;

    tracing::debug!(%id, user_id, bytes = image.data.len(), "stored image");
    Ok(id)
}

#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let (content_type, data): (String, Vec<u8>) = images::table
        .find(id)
        .select((images::content_type, images::data))
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::database("Failed to fetch image", e))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        data,
    ))
}
