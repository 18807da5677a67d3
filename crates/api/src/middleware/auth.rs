//! JWT-based authentication extractors for Axum handlers.
//!
//! The token comes from `Authorization: Bearer <token>`, or failing that
//! from the `access_token` cookie. Its subject is a username, resolved to a
//! user id through the user directory.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use wayside_core::error::CoreError;
use wayside_core::types::DbId;
use wayside_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Cookie consulted when no `Authorization` header is present.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user resolved from the request's access token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
    /// The username carried in `claims.sub`.
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing access token".into()))
        })?;

        let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user_id = UserRepo::find_id_by_username(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::UnknownUser(claims.sub.clone())))?;

        Ok(AuthUser {
            user_id,
            username: claims.sub,
        })
    }
}

/// Optional identity: `None` for anonymous callers and for tokens that are
/// malformed, expired or name an unknown user.
///
/// Only a database failure while resolving the username is surfaced.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Database(err)) => Err(AppError::Database(err)),
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}

/// Pull the raw token from the request, if any.
///
/// A present but non-Bearer `Authorization` header is rejected rather than
/// falling through to the cookie.
fn extract_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let value = header.to_str().unwrap_or_default();
        let token = value.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;
        return Ok(Some(token.trim().to_string()));
    }

    Ok(parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, token)| token.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::Request;

    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_header() {
        let token = extract_token(&parts(&[("authorization", "Bearer abc.def")])).unwrap();
        assert_eq!(token.as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_fallback() {
        let token =
            extract_token(&parts(&[("cookie", "theme=dark; access_token=xyz; lang=en")])).unwrap();
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let token = extract_token(&parts(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "access_token=from-cookie"),
        ]))
        .unwrap();
        assert_eq!(token.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_header_rejected() {
        let result = extract_token(&parts(&[("authorization", "Basic dXNlcjpwdw==")]));
        assert_matches!(result, Err(AppError::Core(CoreError::Unauthorized(_))));
    }

    #[test]
    fn test_no_token() {
        assert!(extract_token(&parts(&[])).unwrap().is_none());
    }
}
