//! Bearer token extractors
//!
//! Handlers that need an authenticated member take one of these as an argument; there is no
//! request-global principal.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::{domain::MemberId, ports::token};

use super::{ApiError, AppState};

/// Extractor that requires a valid bearer token
///
/// Rejects with 401 when the `Authorization` header is missing or the token does not verify.
pub struct AuthMember(pub MemberId);

/// Extractor that resolves the bearer token when there is a valid one
///
/// Never rejects; a missing or invalid token yields `None`.
pub struct MaybeAuthMember(pub Option<MemberId>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthMember {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        match state.tokens.verify(token) {
            Ok(member_id) => Ok(Self(member_id)),
            Err(token::Error::Invalid(reason)) => {
                debug!(%reason, "bearer token rejected");
                Err(ApiError::Unauthorized)
            }
            Err(err) => Err(ApiError::Domain(err.into())),
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthMember {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let member_id = bearer_token(parts).and_then(|token| state.tokens.verify(token).ok());
        Ok(Self(member_id))
    }
}
