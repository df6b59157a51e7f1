use crate::api::tags::TagResponse;
use crate::api::users::response::{subscribed_authors, UserResponse};
use crate::config::Config;
use crate::models::{Recipe, Tag, User};
use crate::schema::{favorites, ingredients, recipe_ingredients, recipe_tags, shopping_carts, tags, users};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

/// Compact recipe representation used by favorite/cart toggles and subscriptions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    /// Absolute image URL
    pub image: String,
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn new(recipe: &Recipe, config: &Config) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: config.media_url(recipe.image_id),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Expand recipes into their full representation as seen by `viewer`,
/// preserving input order. Related rows are loaded in one query per table.
pub fn load_recipe_responses(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    recipes: Vec<Recipe>,
    config: &Config,
) -> QueryResult<Vec<RecipeResponse>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();

    let authors: HashMap<i32, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag.into());
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    let ingredient_rows: Vec<(i32, i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    for (recipe_id, id, name, measurement_unit, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    let (favorited, in_cart, subscribed): (HashSet<i32>, HashSet<i32>, HashSet<i32>) = match viewer
    {
        Some(user_id) => (
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq_any(&recipe_ids))
                .select(favorites::recipe_id)
                .load::<i32>(conn)?
                .into_iter()
                .collect(),
            shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .filter(shopping_carts::recipe_id.eq_any(&recipe_ids))
                .select(shopping_carts::recipe_id)
                .load::<i32>(conn)?
                .into_iter()
                .collect(),
            subscribed_authors(conn, user_id, &author_ids)?,
        ),
        None => Default::default(),
    };

    let mut responses = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let Some(author) = authors.get(&recipe.author_id) else {
            // Cascading deletes make this unreachable short of a concurrent delete.
            tracing::warn!(recipe_id = recipe.id, "Recipe author vanished, skipping");
            continue;
        };
        responses.push(RecipeResponse {
            id: recipe.id,
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            author: UserResponse::new(author, subscribed.contains(&author.id), config),
            ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
            is_favorited: favorited.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
            image: config.media_url(recipe.image_id),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        });
    }

    Ok(responses)
}

/// Full representation of a single recipe.
pub fn load_recipe_response(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    recipe: Recipe,
    config: &Config,
) -> QueryResult<RecipeResponse> {
    load_recipe_responses(conn, viewer, vec![recipe], config)?
        .pop()
        .ok_or(diesel::result::Error::NotFound)
}
