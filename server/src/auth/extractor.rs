use crate::api::ApiError;
use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that validates the Authorization header and provides the authenticated user.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the authenticated User
/// }
/// ```
pub struct AuthUser(pub User);

/// Like [`AuthUser`] but also hands back the raw token, for logout.
pub struct AuthToken {
    pub user: User,
    pub token: String,
}

/// Optional authentication. Anonymous requests get `None`; a header that is
/// present but invalid is still rejected.
pub struct MaybeAuthUser(pub Option<User>);

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    InvalidFormat,
    InvalidToken,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = match err {
            AuthError::MissingHeader => "Authentication credentials were not provided",
            AuthError::InvalidHeader => "Invalid Authorization header",
            AuthError::InvalidFormat => "Invalid Authorization header format",
            AuthError::InvalidToken => "Invalid or expired token",
        };
        ApiError::Unauthorized(message)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Pull the token out of `Authorization: Token <key>` or `Authorization: Bearer <key>`.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    let token = auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidFormat)?;

    Ok(Some(token))
}

async fn authenticate(pool: &DbPool, headers: &HeaderMap) -> Result<Option<(User, String)>, AuthError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(None);
    };

    let user = get_user_from_token(pool, token)
        .await
        .ok_or(AuthError::InvalidToken)?;

    Ok(Some((user, token.to_string())))
}

impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);

        let (user, token) = authenticate(&pool, &parts.headers)
            .await?
            .ok_or(AuthError::MissingHeader)?;

        Ok(AuthToken { user, token })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthToken { user, .. } = AuthToken::from_request_parts(parts, state).await?;
        Ok(AuthUser(user))
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);
        let user = authenticate(&pool, &parts.headers).await?;
        Ok(MaybeAuthUser(user.map(|(user, _)| user)))
    }
}

impl MaybeAuthUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(bearer_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_token_and_bearer_prefixes() {
        assert_eq!(bearer_token(&headers("Token abc123")), Ok(Some("abc123")));
        assert_eq!(bearer_token(&headers("Bearer abc123")), Ok(Some("abc123")));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert_eq!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat)
        );
        assert_eq!(bearer_token(&headers("Token ")), Err(AuthError::InvalidFormat));
    }
}
