use super::find_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_core::ShortLinkCodec;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link/",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Short link to the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_link(
    State(pool): State<Arc<DbPool>>,
    State(short_links): State<Arc<ShortLinkCodec>>,
    Path(id): Path<i32>,
) -> Result<Json<ShortLinkResponse>, ApiError> {
    let mut conn = get_conn!(pool);
    let recipe = find_recipe(&mut conn, id)?;

    Ok(Json(ShortLinkResponse {
        short_link: short_links.encode(recipe.id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_key_is_hyphenated() {
        let codec = ShortLinkCodec::new("https://foodgram.example/s/");
        let json = serde_json::to_value(ShortLinkResponse {
            short_link: codec.encode(255),
        })
        .unwrap();
        assert_eq!(json["short-link"], "https://foodgram.example/s/ff/");
    }
}
