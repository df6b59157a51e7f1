use crate::api::{ApiError, ErrorResponse};
use crate::auth::hash_password;
use crate::db::{is_unique_violation, DbPool};
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, Json};
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use foodgram_core::validation::{validate_signup, SignupDraft};
use foodgram_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

fn duplicate_errors(conn: &mut PgConnection, req: &CreateUserRequest) -> QueryResult<ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email_taken: bool = select(exists(
        users::table.filter(users::email.eq(&req.email)),
    ))
    .get_result(conn)?;
    if email_taken {
        errors.add("email", "A user with that email already exists.");
    }

    let username_taken: bool = select(exists(
        users::table.filter(users::username.eq(&req.username)),
    ))
    .get_result(conn)?;
    if username_taken {
        errors.add("username", "A user with that username already exists.");
    }

    Ok(errors)
}

#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body(content = CreateUserRequest, example = json!({
        "email": "cook@example.com",
        "username": "cook",
        "first_name": "Ada",
        "last_name": "Cook",
        "password": "s3cret-pass"
    })),
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    validate_signup(&SignupDraft {
        email: &req.email,
        username: &req.username,
        first_name: &req.first_name,
        last_name: &req.last_name,
        password: &req.password,
    })?;

    let mut conn = get_conn!(pool);

    let duplicates = duplicate_errors(&mut conn, &req)
        .map_err(|e| ApiError::database("Failed to check existing users", e))?;
    duplicates.into_result()?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to create user")
    })?;

    let new_user = NewUser {
        email: &req.email,
        username: &req.username,
        first_name: &req.first_name,
        last_name: &req.last_name,
        password_hash: &password_hash,
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::BadRequest("A user with that email or username already exists.".to_string())
            } else {
                ApiError::database("Failed to create user", e)
            }
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}
