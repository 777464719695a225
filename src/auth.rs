//! Caller identity resolved by the upstream authentication middleware.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::error::AppError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user email, when known.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Authenticated caller passed explicitly into every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user id issued by the identity provider.
    pub user_id: String,
    /// Email of the user, required to accept invites.
    pub email: Option<String>,
}

impl Identity {
    /// Identity for `user_id`, optionally carrying an email.
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }

    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = header_value(headers, USER_ID_HEADER)?;
        let email = header_value(headers, USER_EMAIL_HEADER);
        Some(Self { user_id, email })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Identity::from_headers(&parts.headers))
    }
}
