//! Management subcommands that operate directly on the database.

use crate::db::DbPool;
use crate::models::{NewIngredient, NewTag};
use crate::schema::{ingredients, recipe_ingredients, tags, users};
use anyhow::{bail, Context, Result};
use diesel::prelude::*;
use foodgram_core::parse_ingredients;
use std::path::Path;

const MAX_TAG_FIELD: usize = 32;

/// Import ingredients from a `name,measurement_unit` CSV file, skipping names
/// already present. Returns the number of rows inserted.
pub fn load_ingredients(pool: &DbPool, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records = parse_ingredients(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let rows: Vec<NewIngredient> = records
        .iter()
        .map(|r| NewIngredient {
            name: &r.name,
            measurement_unit: &r.measurement_unit,
        })
        .collect();

    let mut conn = pool.get()?;
    let inserted = diesel::insert_into(ingredients::table)
        .values(&rows)
        .on_conflict(ingredients::name)
        .do_nothing()
        .execute(&mut conn)
        .context("Failed to insert ingredients")?;

    tracing::info!(
        "Loaded {} ingredient(s) from {} ({} already present)",
        inserted,
        path.display(),
        records.len() - inserted
    );
    Ok(inserted)
}

/// Delete every ingredient that no recipe uses. Returns the number deleted.
pub fn delete_unused_ingredients(pool: &DbPool) -> Result<usize> {
    let mut conn = pool.get()?;

    let deleted = diesel::delete(
        ingredients::table.filter(diesel::dsl::not(
            ingredients::id.eq_any(recipe_ingredients::table.select(recipe_ingredients::ingredient_id)),
        )),
    )
    .execute(&mut conn)
    .context("Failed to delete ingredients")?;

    tracing::info!("Deleted {} unused ingredient(s)", deleted);
    Ok(deleted)
}

fn check_tag(name: &str, slug: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_TAG_FIELD {
        bail!("Tag name must be 1-{} characters", MAX_TAG_FIELD);
    }
    if slug.is_empty()
        || slug.len() > MAX_TAG_FIELD
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("Tag slug must be 1-{} characters of [A-Za-z0-9_-]", MAX_TAG_FIELD);
    }
    Ok(())
}

pub fn create_tag(pool: &DbPool, name: &str, slug: &str) -> Result<i32> {
    let name = name.trim();
    let slug = slug.trim();
    check_tag(name, slug)?;

    let mut conn = pool.get()?;
    let id: i32 = diesel::insert_into(tags::table)
        .values(&NewTag { name, slug })
        .returning(tags::id)
        .get_result(&mut conn)
        .with_context(|| format!("Failed to create tag {:?}", slug))?;

    tracing::info!("Created tag {} ({}) with id {}", name, slug, id);
    Ok(id)
}

/// Grant staff rights, letting the user edit and delete any recipe.
pub fn promote_staff(pool: &DbPool, email: &str) -> Result<()> {
    let mut conn = pool.get()?;

    let updated = diesel::update(users::table.filter(users::email.eq(email)))
        .set(users::is_staff.eq(true))
        .execute(&mut conn)
        .context("Failed to update user")?;

    if updated == 0 {
        bail!("No user with email {}", email);
    }

    tracing::info!("{} is now staff", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_checks() {
        assert!(check_tag("Breakfast", "breakfast").is_ok());
        assert!(check_tag("", "breakfast").is_err());
        assert!(check_tag("Brunch", "brunch time").is_err());
        assert!(check_tag("Brunch", &"b".repeat(33)).is_err());
    }
}
