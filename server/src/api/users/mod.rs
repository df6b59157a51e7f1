pub mod avatar;
pub mod create;
pub mod get;
pub mod list;
pub mod me;
pub mod response;
pub mod set_password;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/", get(list::list_users).post(create::create_user))
        .route("/api/users/me/", get(me::get_me))
        .route(
            "/api/users/me/avatar/",
            put(avatar::put_avatar).delete(avatar::delete_avatar),
        )
        .route("/api/users/set_password/", post(set_password::set_password))
        .route("/api/users/subscriptions/", get(subscriptions::list_subscriptions))
        .route("/api/users/{id}/", get(get::get_user))
        .route(
            "/api/users/{id}/subscribe/",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        create::create_user,
        get::get_user,
        me::get_me,
        set_password::set_password,
        avatar::put_avatar,
        avatar::delete_avatar,
        subscriptions::list_subscriptions,
        subscribe::subscribe,
        subscribe::unsubscribe,
    ),
    components(schemas(
        response::UserResponse,
        response::SubscriptionUserResponse,
        create::CreateUserRequest,
        create::CreateUserResponse,
        set_password::SetPasswordRequest,
        avatar::AvatarRequest,
        avatar::AvatarResponse,
    ))
)]
pub struct ApiDoc;
