//! Payload validation for recipes and user accounts.
//!
//! Checks that need the database (does this tag id exist, is this email
//! taken) are done by the server; everything decidable from the payload
//! alone lives here.

use std::collections::HashSet;

use crate::error::ValidationErrors;

pub const MAX_RECIPE_NAME: usize = 256;
pub const MAX_EMAIL: usize = 254;
pub const MAX_USERNAME: usize = 150;
pub const MAX_PERSON_NAME: usize = 150;
pub const MAX_INGREDIENT_NAME: usize = 128;
pub const MAX_MEASUREMENT_UNIT: usize = 64;

const REQUIRED: &str = "This field is required.";

/// Usernames that would shadow fixed routes under /api/users/.
const RESERVED_USERNAMES: &[&str] = &["me", "subscriptions", "set_password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Update,
}

/// Borrowed view of a recipe create/update payload. `None` means the field
/// was absent from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeDraft<'a> {
    pub name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<&'a [IngredientAmount]>,
    pub tags: Option<&'a [i32]>,
    pub image: Option<&'a str>,
}

/// On create every field is required. On update the scalar fields and the
/// image may be omitted, but ingredients and tags must always be sent
/// because they replace the existing sets.
pub fn validate_recipe(draft: &RecipeDraft<'_>, mode: DraftMode) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let creating = mode == DraftMode::Create;

    match draft.name {
        Some(name) if name.trim().is_empty() => errors.add("name", "Name cannot be empty."),
        Some(name) if name.chars().count() > MAX_RECIPE_NAME => errors.add(
            "name",
            format!("Ensure this field has no more than {} characters.", MAX_RECIPE_NAME),
        ),
        Some(_) => {}
        None if creating => errors.add("name", REQUIRED),
        None => {}
    }

    match draft.text {
        Some(text) if text.trim().is_empty() => errors.add("text", "Text cannot be empty."),
        Some(_) => {}
        None if creating => errors.add("text", REQUIRED),
        None => {}
    }

    match draft.cooking_time {
        Some(minutes) if minutes < 1 => errors.add(
            "cooking_time",
            "Ensure this value is greater than or equal to 1.",
        ),
        Some(_) => {}
        None if creating => errors.add("cooking_time", REQUIRED),
        None => {}
    }

    match draft.image {
        Some(image) if image.trim().is_empty() => errors.add("image", "Image cannot be empty."),
        Some(_) => {}
        None if creating => errors.add("image", REQUIRED),
        None => {}
    }

    match draft.ingredients {
        None => errors.add("ingredients", REQUIRED),
        Some([]) => errors.add("ingredients", "At least one ingredient is required."),
        Some(ingredients) => {
            let mut seen = HashSet::new();
            if !ingredients.iter().all(|i| seen.insert(i.id)) {
                errors.add("ingredients", "Ingredients must not repeat.");
            }
            if ingredients.iter().any(|i| i.amount < 1) {
                errors.add(
                    "ingredients",
                    "Ensure every amount is greater than or equal to 1.",
                );
            }
        }
    }

    match draft.tags {
        None => errors.add("tags", REQUIRED),
        Some([]) => errors.add("tags", "At least one tag is required."),
        Some(tags) => {
            let mut seen = HashSet::new();
            if !tags.iter().all(|t| seen.insert(*t)) {
                errors.add("tags", "Tags must not repeat.");
            }
        }
    }

    errors.into_result()
}

#[derive(Debug, Clone, Copy)]
pub struct SignupDraft<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

pub fn validate_signup(draft: &SignupDraft<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.email.is_empty() {
        errors.add("email", REQUIRED);
    } else if draft.email.chars().count() > MAX_EMAIL {
        errors.add(
            "email",
            format!("Ensure this field has no more than {} characters.", MAX_EMAIL),
        );
    } else if !is_valid_email(draft.email) {
        errors.add("email", "Enter a valid email address.");
    }

    if draft.username.is_empty() {
        errors.add("username", REQUIRED);
    } else if draft.username.chars().count() > MAX_USERNAME {
        errors.add(
            "username",
            format!("Ensure this field has no more than {} characters.", MAX_USERNAME),
        );
    } else if !is_valid_username(draft.username) {
        errors.add(
            "username",
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else if RESERVED_USERNAMES.contains(&draft.username.to_lowercase().as_str()) {
        errors.add("username", "This username is reserved.");
    }

    for (field, value) in [("first_name", draft.first_name), ("last_name", draft.last_name)] {
        if value.trim().is_empty() {
            errors.add(field, REQUIRED);
        } else if value.chars().count() > MAX_PERSON_NAME {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", MAX_PERSON_NAME),
            );
        }
    }

    if let Err(e) = validate_password(draft.password) {
        for message in &e.fields()["password"] {
            errors.add("password", message.clone());
        }
    }

    errors.into_result()
}

pub fn validate_password(password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if password.is_empty() {
        errors.add("password", REQUIRED);
    } else if password.chars().count() < 8 {
        errors.add("password", "Password must be at least 8 characters long.");
    } else if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password", "Password cannot be entirely numeric.");
    }
    errors.into_result()
}

/// Letters, digits and `_ . @ + -`.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
