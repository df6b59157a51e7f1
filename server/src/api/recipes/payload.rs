use crate::api::media::store_image;
use crate::api::ApiError;
use crate::models::{NewRecipeIngredient, NewRecipeTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use diesel::prelude::*;
use foodgram_core::validation::{validate_recipe, DraftMode, IngredientAmount, RecipeDraft};
use foodgram_core::ValidationErrors;
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct IngredientAmountPayload {
    /// Ingredient ID
    pub id: i32,
    pub amount: i32,
}

/// Body of `POST /api/recipes/` and `PATCH /api/recipes/{id}/`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipePayload {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmountPayload>>,
    pub tags: Option<Vec<i32>>,
    /// Base64 data URI; required on create
    pub image: Option<String>,
}

/// Payload after validation, with ingredient amounts and tags in request order.
#[derive(Debug)]
pub struct ValidRecipe<'a> {
    pub name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
    pub image: Option<&'a str>,
}

impl RecipePayload {
    /// Run shape validation (required fields, bounds, duplicates).
    pub fn validate(&self, mode: DraftMode) -> Result<ValidRecipe<'_>, ValidationErrors> {
        let ingredients: Option<Vec<IngredientAmount>> = self.ingredients.as_ref().map(|items| {
            items
                .iter()
                .map(|i| IngredientAmount {
                    id: i.id,
                    amount: i.amount,
                })
                .collect()
        });

        validate_recipe(
            &RecipeDraft {
                name: self.name.as_deref(),
                text: self.text.as_deref(),
                cooking_time: self.cooking_time,
                ingredients: ingredients.as_deref(),
                tags: self.tags.as_deref(),
                image: self.image.as_deref(),
            },
            mode,
        )?;

        Ok(ValidRecipe {
            name: self.name.as_deref().map(str::trim),
            text: self.text.as_deref(),
            cooking_time: self.cooking_time,
            ingredients: ingredients.unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            image: self.image.as_deref().filter(|i| !i.is_empty()),
        })
    }
}

impl ValidRecipe<'_> {
    /// Check that every referenced ingredient and tag exists.
    pub fn check_references(&self, conn: &mut PgConnection) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();

        let ingredient_ids: Vec<i32> = self.ingredients.iter().map(|i| i.id).collect();
        let known: HashSet<i32> = ingredients::table
            .filter(ingredients::id.eq_any(&ingredient_ids))
            .select(ingredients::id)
            .load::<i32>(conn)
            .map_err(|e| ApiError::database("Failed to check ingredients", e))?
            .into_iter()
            .collect();
        for id in ingredient_ids.iter().filter(|id| !known.contains(id)) {
            errors.add("ingredients", format!("Ingredient {} does not exist.", id));
        }

        let known: HashSet<i32> = tags::table
            .filter(tags::id.eq_any(&self.tags))
            .select(tags::id)
            .load::<i32>(conn)
            .map_err(|e| ApiError::database("Failed to check tags", e))?
            .into_iter()
            .collect();
        for id in self.tags.iter().filter(|id| !known.contains(id)) {
            errors.add("tags", format!("Tag {} does not exist.", id));
        }

        errors.into_result().map_err(ApiError::from)
    }

    pub fn store_image(&self, conn: &mut PgConnection, user_id: i32) -> Result<Option<Uuid>, ApiError> {
        self.image
            .map(|payload| store_image(conn, user_id, "image", payload))
            .transpose()
    }

    /// Replace the recipe's ingredient lines and tag links wholesale. Call
    /// inside a transaction.
    pub fn write_links(&self, conn: &mut PgConnection, recipe_id: i32) -> QueryResult<()> {
        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
            .execute(conn)?;
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
            .execute(conn)?;

        let lines: Vec<NewRecipeIngredient> = self
            .ingredients
            .iter()
            .map(|i| NewRecipeIngredient {
                recipe_id,
                ingredient_id: i.id,
                amount: i.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&lines)
            .execute(conn)?;

        let links: Vec<NewRecipeTag> = self
            .tags
            .iter()
            .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
            .collect();
        diesel::insert_into(recipe_tags::table)
            .values(&links)
            .execute(conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    fn payload() -> RecipePayload {
        serde_json::from_value(serde_json::json!({
            "name": "  Pancakes ",
            "text": "Mix and fry.",
            "cooking_time": 15,
            "ingredients": [{"id": 1, "amount": 200}, {"id": 2, "amount": 2}],
            "tags": [1, 2],
            "image": PNG
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_payload_keeps_request_order() {
        let payload = payload();
        let valid = payload.validate(DraftMode::Create).unwrap();
        assert_eq!(valid.name, Some("Pancakes"));
        assert_eq!(valid.ingredients.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(valid.tags, vec![1, 2]);
        assert!(valid.image.is_some());
    }

    #[test]
    fn test_update_without_tags_rejected() {
        let payload = RecipePayload {
            tags: None,
            ..payload()
        };
        let errors = payload.validate(DraftMode::Update).unwrap_err();
        assert!(errors.has("tags"));
    }

    #[test]
    fn test_update_may_omit_image() {
        let payload = RecipePayload {
            image: None,
            ..payload()
        };
        let valid = payload.validate(DraftMode::Update).unwrap();
        assert!(valid.image.is_none());
        assert!(payload.validate(DraftMode::Create).is_err());
    }
}
