pub mod get;
pub mod list;

use crate::models::Tag;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// Returns the router for /api/tags endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tags/", get(list::list_tags))
        .route("/api/tags/{id}/", get(get::get_tag))
}

#[derive(OpenApi)]
#[openapi(paths(list::list_tags, get::get_tag), components(schemas(TagResponse)))]
pub struct ApiDoc;
