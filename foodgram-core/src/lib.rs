//! Domain logic for the Foodgram recipe service.
//!
//! Nothing in this crate touches the database or HTTP. The server wires these
//! pieces to diesel and axum.

pub mod error;
pub mod image;
pub mod ingredients_csv;
pub mod pagination;
pub mod relations;
pub mod shopping_list;
pub mod short_link;
pub mod validation;

pub use error::{CsvError, ImageError, RelationError, ShortLinkError, StoreError, ValidationErrors};
pub use image::{decode_data_uri, DecodedImage};
pub use ingredients_csv::{parse_ingredients, IngredientRecord};
pub use pagination::{PageParams, PageRequest};
pub use relations::{MemoryRelationStore, RecipeId, RelationKind, RelationStore, UserId};
pub use shopping_list::{aggregate, render, IngredientLine, ShoppingItem};
pub use short_link::ShortLinkCodec;
