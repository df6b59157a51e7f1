use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use foodgram_core::ShortLinkCodec;
use std::sync::Arc;
use utoipa::OpenApi;

/// Returns the router for /s short links
pub fn router() -> Router<AppState> {
    Router::new().route("/s/{token}/", get(follow_short_link))
}

#[derive(OpenApi)]
#[openapi(paths(follow_short_link))]
pub struct ApiDoc;

fn recipe_location(recipe_id: i32) -> String {
    format!("/api/recipes/{}/", recipe_id)
}

/// Redirect a short link to its recipe. The recipe is not looked up here; an
/// unknown id surfaces as 404 from the recipe endpoint.
#[utoipa::path(
    get,
    path = "/s/{token}/",
    tag = "recipes",
    params(("token" = String, Path, description = "Lowercase hex recipe ID")),
    responses(
        (status = 302, description = "Redirect to the recipe"),
        (status = 404, description = "Malformed token", body = ErrorResponse)
    )
)]
pub async fn follow_short_link(
    State(short_links): State<Arc<ShortLinkCodec>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = short_links.decode(&token).map_err(|e| {
        tracing::debug!("{}", e);
        ApiError::not_found("Recipe not found")
    })?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, recipe_location(recipe_id))],
    ))
}
