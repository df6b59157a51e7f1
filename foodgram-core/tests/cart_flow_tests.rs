//! End-to-end checks of the cart flow: toggle recipes in and out of a user's
//! cart, then build the shopping list from whatever is left in it.
//!
//! Recipes come from an inline JSON fixture shaped like the API's ingredient
//! lines (`{name, measurement_unit, amount}`).

use std::collections::HashMap;

use foodgram_core::relations::{add, remove};
use foodgram_core::{
    aggregate, render, IngredientLine, MemoryRelationStore, RecipeId, RelationError, RelationKind,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FixtureLine {
    name: String,
    measurement_unit: String,
    amount: i32,
}

const RECIPES: &str = r#"{
    "1": [{"name": "flour", "measurement_unit": "g", "amount": 200}],
    "2": [
        {"name": "flour", "measurement_unit": "g", "amount": 100},
        {"name": "egg", "measurement_unit": "pcs", "amount": 2}
    ],
    "3": [
        {"name": "butter", "measurement_unit": "g", "amount": 50},
        {"name": "egg", "measurement_unit": "pcs", "amount": 1}
    ]
}"#;

fn recipes() -> HashMap<RecipeId, Vec<FixtureLine>> {
    let raw: HashMap<String, Vec<FixtureLine>> = serde_json::from_str(RECIPES).unwrap();
    raw.into_iter()
        .map(|(id, lines)| (id.parse().unwrap(), lines))
        .collect()
}

fn shopping_list(store: &MemoryRelationStore, user_id: i32) -> Vec<(String, String, i64)> {
    let catalogue = recipes();
    let lines = store
        .targets(RelationKind::Cart, user_id)
        .into_iter()
        .flat_map(|recipe_id| &catalogue[&recipe_id])
        .map(|l| IngredientLine::new(l.name.clone(), l.measurement_unit.clone(), l.amount));

    aggregate(lines.collect::<Vec<_>>())
        .into_iter()
        .map(|i| (i.name, i.measurement_unit, i.total))
        .collect()
}

#[test]
fn test_cart_with_two_recipes() {
    let mut store = MemoryRelationStore::new();
    add(&mut store, RelationKind::Cart, 7, 1).unwrap();
    add(&mut store, RelationKind::Cart, 7, 2).unwrap();

    assert_eq!(
        shopping_list(&store, 7),
        vec![
            ("egg".to_string(), "pcs".to_string(), 2),
            ("flour".to_string(), "g".to_string(), 300),
        ]
    );
}

#[test]
fn test_removed_recipe_drops_out_of_list() {
    let mut store = MemoryRelationStore::new();
    for recipe_id in [1, 2, 3] {
        add(&mut store, RelationKind::Cart, 7, recipe_id).unwrap();
    }
    remove(&mut store, RelationKind::Cart, 7, 2).unwrap();

    assert_eq!(
        shopping_list(&store, 7),
        vec![
            ("butter".to_string(), "g".to_string(), 50),
            ("egg".to_string(), "pcs".to_string(), 1),
            ("flour".to_string(), "g".to_string(), 200),
        ]
    );
}

#[test]
fn test_favorites_do_not_affect_shopping_list() {
    let mut store = MemoryRelationStore::new();
    add(&mut store, RelationKind::Favorite, 7, 1).unwrap();
    add(&mut store, RelationKind::Favorite, 7, 2).unwrap();

    assert!(shopping_list(&store, 7).is_empty());
}

#[test]
fn test_carts_are_per_user() {
    let mut store = MemoryRelationStore::new();
    add(&mut store, RelationKind::Cart, 7, 1).unwrap();
    add(&mut store, RelationKind::Cart, 8, 3).unwrap();

    assert_eq!(shopping_list(&store, 7).len(), 1);
    assert_eq!(shopping_list(&store, 8).len(), 2);
}

#[test]
fn test_double_add_leaves_single_entry() {
    let mut store = MemoryRelationStore::new();
    add(&mut store, RelationKind::Cart, 7, 1).unwrap();
    assert!(matches!(
        add(&mut store, RelationKind::Cart, 7, 1),
        Err(RelationError::Conflict(_))
    ));

    // Still counted once.
    assert_eq!(
        shopping_list(&store, 7),
        vec![("flour".to_string(), "g".to_string(), 200)]
    );
}

#[test]
fn test_rendered_download() {
    let mut store = MemoryRelationStore::new();
    add(&mut store, RelationKind::Cart, 7, 1).unwrap();
    add(&mut store, RelationKind::Cart, 7, 2).unwrap();

    let catalogue = recipes();
    let lines: Vec<IngredientLine> = store
        .targets(RelationKind::Cart, 7)
        .into_iter()
        .flat_map(|id| &catalogue[&id])
        .map(|l| IngredientLine::new(l.name.clone(), l.measurement_unit.clone(), l.amount))
        .collect();

    assert_eq!(
        render(&aggregate(lines)),
        "Your shopping list:\negg - 2 pcs\nflour - 300 g"
    );
}
