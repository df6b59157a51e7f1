use crate::api::media::store_image;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{images, users};
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// Base64 data URI (`data:image/png;base64,...`)
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Store the decoded avatar and point the user at it, all in one transaction.
fn set_avatar(
    conn: &mut PgConnection,
    user_id: i32,
    old: Option<Uuid>,
    payload: &str,
) -> Result<Uuid, ApiError> {
    conn.transaction::<_, ApiError, _>(|conn| {
        let avatar_id = store_image(conn, user_id, "avatar", payload)?;
        replace_avatar(conn, user_id, old, Some(avatar_id))
            .map_err(|e| ApiError::database("Failed to update avatar", e))?;
        Ok(avatar_id)
    })
}

/// Point the user at `avatar_id` and drop the image it replaces.
fn replace_avatar(
    conn: &mut PgConnection,
    user_id: i32,
    old: Option<Uuid>,
    avatar_id: Option<Uuid>,
) -> QueryResult<()> {
    conn.transaction(|conn| {
        diesel::update(users::table.find(user_id))
            .set(users::avatar_id.eq(avatar_id))
            .execute(conn)?;
        if let Some(old_id) = old {
            diesel::delete(images::table.find(old_id)).execute(conn)?;
        }
        Ok(())
    })
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn put_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Json(req): Json<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let payload = req
        .avatar
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::field("avatar", "This field is required."))?;

    let mut conn = get_conn!(pool);

    let avatar_id = set_avatar(&mut conn, user.id, user.avatar_id, &payload)?;

    Ok(Json(AvatarResponse {
        avatar: config.media_url(avatar_id),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    replace_avatar(&mut conn, user.id, user.avatar_id, None)
        .map_err(|e| ApiError::database("Failed to remove avatar", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_image, insert_recipe, insert_user, test_connection};

    const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn image_count(conn: &mut PgConnection, user_id: i32) -> i64 {
        images::table
            .filter(images::user_id.eq(user_id))
            .count()
            .get_result(conn)
            .unwrap()
    }

    #[test]
    fn test_set_avatar_replaces_previous_image() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn);
        let old = insert_image(&mut conn, user);

        let avatar_id = set_avatar(&mut conn, user, Some(old), PNG_1X1).unwrap();

        let current: Option<Uuid> = users::table
            .find(user)
            .select(users::avatar_id)
            .first(&mut conn)
            .unwrap();
        assert_eq!(current, Some(avatar_id));
        assert_eq!(image_count(&mut conn, user), 1);
    }

    #[test]
    fn test_failed_replace_leaves_no_stored_image() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn);
        // The old image is still a recipe's picture, so deleting it fails.
        let old = insert_image(&mut conn, user);
        insert_recipe(&mut conn, user, old);

        assert!(set_avatar(&mut conn, user, Some(old), PNG_1X1).is_err());
        assert_eq!(image_count(&mut conn, user), 1);
    }

    #[test]
    fn test_bad_payload_is_a_field_error() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn);
        let err = set_avatar(&mut conn, user, None, "not an image").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(image_count(&mut conn, user), 0);
    }
}
