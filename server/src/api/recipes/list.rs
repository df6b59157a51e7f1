use super::response::{load_recipe_responses, RecipeResponse};
use crate::api::pagination::{check_page, Paginated};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{favorites, recipe_tags, recipes, shopping_carts, tags};
use axum::{
    extract::{OriginalUri, State},
    Json,
};
use axum_extra::extract::Query;
use diesel::pg::Pg;
use diesel::prelude::*;
use foodgram_core::{PageParams, PageRequest};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct RecipeFilters {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches if it has any of them
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Boolean query flag in the `1`/`true` style. Anything else is "not set".
fn flag(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes")
    )
}

/// A flag that was sent with a value, whatever that value is.
fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

type BoxedRecipes<'a> = recipes::BoxedQuery<'a, Pg>;

fn filtered<'a>(filters: &'a RecipeFilters, viewer: Option<i32>) -> Option<BoxedRecipes<'a>> {
    let mut query = recipes::table.into_boxed();

    if let Some(author) = filters.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if !filters.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(&filters.tags))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if present(&filters.is_favorited) || present(&filters.is_in_shopping_cart) {
        // Anonymous callers get nothing back whatever the flag says.
        let user_id = viewer?;
        let wants_favorites = flag(&filters.is_favorited);
        let wants_cart = flag(&filters.is_in_shopping_cart);
        if wants_favorites {
            query = query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(user_id))
                        .select(favorites::recipe_id),
                ),
            );
        }
        if wants_cart {
            query = query.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(user_id))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
    }

    Some(query)
}

#[utoipa::path(
    get,
    path = "/api/recipes/",
    tag = "recipes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("author" = Option<i32>, Query, description = "Author ID"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs (repeatable)"),
        ("is_favorited" = Option<String>, Query, description = "1 to show only favorites"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "1 to show only recipes in the cart")
    ),
    responses(
        (status = 200, description = "Recipes, newest first", body = Paginated<RecipeResponse>),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Query(filters): Query<RecipeFilters>,
) -> Result<Json<Paginated<RecipeResponse>>, ApiError> {
    let mut conn = get_conn!(pool);
    let page = PageRequest::from_params(
        PageParams {
            page: filters.page,
            limit: filters.limit,
        },
        config.page_size,
    );
    let base_url = config.public_base_url.as_str();

    let Some(count_query) = filtered(&filters, viewer.id()) else {
        check_page(&page, 0)?;
        return Ok(Json(Paginated::new(Vec::new(), 0, &page, base_url, &uri)));
    };

    let total: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(|e| ApiError::database("Failed to count recipes", e))?;
    check_page(&page, total)?;

    let rows: Vec<Recipe> = filtered(&filters, viewer.id())
        .ok_or_else(|| ApiError::internal("Failed to build recipe query"))?
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .limit(page.limit)
        .offset(page.offset())
        .select(Recipe::as_select())
        .load(&mut conn)
        .map_err(|e| ApiError::database("Failed to fetch recipes", e))?;

    let results = load_recipe_responses(&mut conn, viewer.id(), rows, &config)
        .map_err(|e| ApiError::database("Failed to fetch recipe details", e))?;

    Ok(Json(Paginated::new(results, total, &page, base_url, &uri)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert!(flag(&Some("1".to_string())));
        assert!(flag(&Some("True".to_string())));
        assert!(!flag(&Some("0".to_string())));
        assert!(!flag(&None));
    }

    #[test]
    fn test_repeated_tags_deserialize() {
        let Query(filters): Query<RecipeFilters> =
            Query::try_from_uri(&"/api/recipes/?tags=lunch&tags=dinner&author=3".parse().unwrap())
                .unwrap();
        assert_eq!(filters.tags, vec!["lunch", "dinner"]);
        assert_eq!(filters.author, Some(3));
    }

    #[test]
    fn test_anonymous_favorites_filter_matches_nothing() {
        let filters = RecipeFilters {
            is_favorited: Some("1".to_string()),
            ..Default::default()
        };
        assert!(filtered(&filters, None).is_none());
        assert!(filtered(&filters, Some(1)).is_some());
    }

    #[test]
    fn test_anonymous_relation_filter_off_still_matches_nothing() {
        for filters in [
            RecipeFilters {
                is_favorited: Some("0".to_string()),
                ..Default::default()
            },
            RecipeFilters {
                is_in_shopping_cart: Some("0".to_string()),
                ..Default::default()
            },
        ] {
            assert!(filtered(&filters, None).is_none());
            assert!(filtered(&filters, Some(1)).is_some());
        }
        assert!(filtered(&RecipeFilters::default(), None).is_some());

        let blank = RecipeFilters {
            is_favorited: Some(String::new()),
            ..Default::default()
        };
        assert!(filtered(&blank, None).is_some());
    }
}
