use crate::api::recipes::response::ShortRecipeResponse;
use crate::config::Config;
use crate::models::{Recipe, User};
use crate::schema::{recipes, subscriptions};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

pub const DEFAULT_RECIPES_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the current user follows this user; always false for anonymous callers
    pub is_subscribed: bool,
    /// Absolute avatar URL
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(user: &User, is_subscribed: bool, config: &Config) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar_id.map(|id| config.media_url(id)),
        }
    }
}

/// A followed author together with a preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: i64,
}

/// Which of `author_ids` the user follows.
pub fn subscribed_authors(
    conn: &mut PgConnection,
    user_id: i32,
    author_ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    Ok(subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load::<i32>(conn)?
        .into_iter()
        .collect())
}

pub fn load_user_responses(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    users: &[User],
    config: &Config,
) -> QueryResult<Vec<UserResponse>> {
    let subscribed = match viewer {
        Some(viewer_id) => {
            let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
            subscribed_authors(conn, viewer_id, &ids)?
        }
        None => HashSet::new(),
    };

    Ok(users
        .iter()
        .map(|u| UserResponse::new(u, subscribed.contains(&u.id), config))
        .collect())
}

/// Subscription shape for authors `viewer` already follows. `recipes_limit`
/// caps the preview list, newest first; `recipes_count` is the full count.
pub fn load_subscription_responses(
    conn: &mut PgConnection,
    authors: &[User],
    recipes_limit: i64,
    config: &Config,
) -> QueryResult<Vec<SubscriptionUserResponse>> {
    let mut responses = Vec::with_capacity(authors.len());

    for author in authors {
        let recipes_count: i64 = recipes::table
            .filter(recipes::author_id.eq(author.id))
            .count()
            .get_result(conn)?;

        let preview: Vec<Recipe> = recipes::table
            .filter(recipes::author_id.eq(author.id))
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(recipes_limit)
            .select(Recipe::as_select())
            .load(conn)?;

        responses.push(SubscriptionUserResponse {
            user: UserResponse::new(author, true, config),
            recipes: preview
                .iter()
                .map(|r| ShortRecipeResponse::new(r, config))
                .collect(),
            recipes_count,
        });
    }

    Ok(responses)
}

/// `recipes_limit` query value; missing or negative falls back to the default.
pub fn recipes_limit(raw: Option<i64>) -> i64 {
    match raw {
        Some(limit) if limit >= 0 => limit,
        _ => DEFAULT_RECIPES_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://db".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn user(avatar_id: Option<Uuid>) -> User {
        User {
            id: 7,
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Cook".to_string(),
            password_hash: "$argon2id$...".to_string(),
            avatar_id,
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_response_hides_password_and_expands_avatar() {
        let config = config();
        let response = UserResponse::new(&user(Some(Uuid::nil())), true, &config);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(
            json["avatar"],
            "http://localhost:3000/media/00000000-0000-0000-0000-000000000000"
        );

        let response = UserResponse::new(&user(None), false, &config);
        assert!(response.avatar.is_none());
    }

    #[test]
    fn test_subscription_shape_is_flat() {
        let config = config();
        let response = SubscriptionUserResponse {
            user: UserResponse::new(&user(None), true, &config),
            recipes: Vec::new(),
            recipes_count: 3,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["username"], "cook");
        assert_eq!(json["recipes_count"], 3);
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_recipes_limit_defaults() {
        assert_eq!(recipes_limit(None), DEFAULT_RECIPES_LIMIT);
        assert_eq!(recipes_limit(Some(-1)), DEFAULT_RECIPES_LIMIT);
        assert_eq!(recipes_limit(Some(2)), 2);
    }
}
