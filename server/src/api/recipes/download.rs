use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, shopping_carts};
use axum::{extract::State, http::header, response::IntoResponse};
use diesel::dsl::sum;
use diesel::prelude::*;
use foodgram_core::shopping_list::{file_name, render};
use foodgram_core::ShoppingItem;
use std::sync::Arc;

/// Ingredient totals for the user's cart, grouped and ordered by the database.
///
/// Ordering follows the database collation of `ingredients.name`, matching the
/// catalogue listing.
fn cart_items(conn: &mut PgConnection, user_id: i32) -> QueryResult<Vec<ShoppingItem>> {
    let rows: Vec<(String, String, Option<i64>)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(
            recipe_ingredients::recipe_id.eq_any(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .select(shopping_carts::recipe_id),
            ),
        )
        .group_by((ingredients::name, ingredients::measurement_unit))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            sum(recipe_ingredients::amount),
        ))
        .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(name, measurement_unit, total)| ShoppingItem {
            name,
            measurement_unit,
            total: total.unwrap_or(0),
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list", content_type = "text/plain", body = String),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let items = cart_items(&mut conn, user.id)
        .map_err(|e| ApiError::database("Failed to load shopping cart", e))?;

    tracing::debug!(user_id = user.id, items = items.len(), "shopping list built");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name(&user.username)),
            ),
        ],
        render(&items),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_image, insert_recipe, insert_user, test_connection, unique};
    use crate::models::{NewIngredient, NewRecipeIngredient};
    use std::collections::HashMap;

    fn ingredient(conn: &mut PgConnection, name: &str, unit: &str) -> (i32, String) {
        let name = unique(name);
        let id = diesel::insert_into(ingredients::table)
            .values(&NewIngredient {
                name: &name,
                measurement_unit: unit,
            })
            .returning(ingredients::id)
            .get_result(conn)
            .unwrap();
        (id, name)
    }

    fn link(conn: &mut PgConnection, recipe_id: i32, ingredient_id: i32, amount: i32) {
        diesel::insert_into(recipe_ingredients::table)
            .values(&NewRecipeIngredient {
                recipe_id,
                ingredient_id,
                amount,
            })
            .execute(conn)
            .unwrap();
    }

    fn add_to_cart(conn: &mut PgConnection, user_id: i32, recipe_id: i32) {
        diesel::insert_into(shopping_carts::table)
            .values((
                shopping_carts::user_id.eq(user_id),
                shopping_carts::recipe_id.eq(recipe_id),
            ))
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn test_cart_items_are_summed_and_follow_name_order() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let conn = &mut conn;

        let user = insert_user(conn);
        let image = insert_image(conn, user);
        let (apple, apple_name) = ingredient(conn, "apple", "g");
        let (egg, egg_name) = ingredient(conn, "Egg", "pcs");
        let (yo, yo_name) = ingredient(conn, "ёлочка", "pcs");
        let (ya, ya_name) = ingredient(conn, "яблоко", "kg");

        let first = insert_recipe(conn, user, image);
        link(conn, first, apple, 200);
        link(conn, first, egg, 2);
        let second = insert_recipe(conn, user, image);
        link(conn, second, apple, 100);
        link(conn, second, yo, 1);
        link(conn, second, ya, 3);
        let outside = insert_recipe(conn, user, image);
        link(conn, outside, egg, 5);

        add_to_cart(conn, user, first);
        add_to_cart(conn, user, second);

        let items = cart_items(conn, user).unwrap();

        let totals: HashMap<&str, i64> = items
            .iter()
            .map(|item| (item.name.as_str(), item.total))
            .collect();
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[apple_name.as_str()], 300);
        assert_eq!(totals[egg_name.as_str()], 2);
        assert_eq!(totals[yo_name.as_str()], 1);
        assert_eq!(totals[ya_name.as_str()], 3);

        let expected: Vec<String> = ingredients::table
            .filter(ingredients::id.eq_any(vec![apple, egg, yo, ya]))
            .order(ingredients::name.asc())
            .select(ingredients::name)
            .load(conn)
            .unwrap();
        let names: Vec<String> = items.into_iter().map(|item| item.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_empty_cart_has_no_items() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn);
        assert!(cart_items(&mut conn, user).unwrap().is_empty());
    }
}
