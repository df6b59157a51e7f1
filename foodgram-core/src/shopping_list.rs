//! Shopping list aggregation.
//!
//! The server groups and orders cart lines in SQL; [`aggregate`] does the same
//! fold in memory, one entry per (ingredient, unit). [`render`] produces the
//! downloadable text file.

use std::collections::HashMap;

use serde::Serialize;

pub const SHOPPING_LIST_HEADER: &str = "Your shopping list:";

/// One ingredient line of a recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl IngredientLine {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i32) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Sort key approximating a `ru_RU` collation: case-insensitive, with `ё`
/// filed next to `е` instead of after `я`.
pub fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

/// Sum amounts per (name, unit), ordered by name then unit.
///
/// The same ingredient in two different units stays as two entries.
pub fn aggregate<I>(lines: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = IngredientLine>,
{
    let mut totals: HashMap<(String, String), i64> = HashMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += i64::from(line.amount);
    }

    let mut items: Vec<ShoppingItem> = totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingItem {
            name,
            measurement_unit,
            total,
        })
        .collect();
    items.sort_by_cached_key(|item| {
        (
            collation_key(&item.name),
            item.name.clone(),
            item.measurement_unit.clone(),
        )
    });
    items
}

/// Render the plain-text file: a header, then `"{name} - {total} {unit}"` per item.
pub fn render(items: &[ShoppingItem]) -> String {
    let mut content = Vec::with_capacity(items.len() + 1);
    content.push(SHOPPING_LIST_HEADER.to_string());
    content.extend(
        items
            .iter()
            .map(|item| format!("{} - {} {}", item.name, item.total, item.measurement_unit)),
    );
    content.join("\n")
}

/// Attachment filename for a user's download.
pub fn file_name(username: &str) -> String {
    format!("shopping_cart_{}.txt", username)
}
