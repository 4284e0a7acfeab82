//! Request authentication.
//!
//! Credentials arrive either as `Authorization: Bearer <token>` or in the
//! `token` cookie; the header wins when both are present. Every failure mode
//! gets its own reason string so clients can tell a missing credential from
//! an invalid or expired one.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::domain::DomainError;
use crate::domain::model::{User, UserRole};
use crate::security::TokenError;
use crate::state::AppState;

use super::error::ApiError;

pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller. Extracting it performs token verification and
/// the subject lookup; handlers that take it are authenticated routes.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Role gate. Ownership checks stay in the domain services.
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(ApiError::new(
                axum::http::StatusCode::FORBIDDEN,
                "Access denied",
            ))
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::unauthorized("No token, authorization denied"))?;

        let claims = state.signer.verify(&token).map_err(|e| match e {
            TokenError::Expired => ApiError::unauthorized("Token expired"),
            TokenError::Invalid => ApiError::unauthorized("Invalid token"),
        })?;

        // Only a genuinely missing subject is an auth failure; a storage
        // error keeps its 500 mapping.
        let user = state
            .users
            .get_user(claims.sub)
            .await
            .map_err(|err| match err {
                DomainError::UserNotFound => ApiError::unauthorized("User not found"),
                other => other.into(),
            })?;

        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(TOKEN_COOKIE).map(|c| c.value().to_owned())
}

/// Session cookie carrying the freshly issued token.
pub fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(1))
        .build()
}

/// Expired cookie that removes the session on the client.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
