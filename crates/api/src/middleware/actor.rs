//! Acting principal extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user as `x-actor-id`. Mutating handlers take [`Actor`] and thread its
//! [`UserId`] into every core call so audit fields are always set.

use axum::{extract::FromRequestParts, http::request::Parts};
use petledger_shared::AppError;
use petledger_shared::types::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the acting user's UUID.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user on whose behalf a mutating request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl Actor {
    /// Returns the acting user's ID.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }
}

fn parse_actor(value: Option<&str>) -> Result<Actor, AppError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} header is required")))?;

    Uuid::parse_str(value)
        .map(|id| Actor(UserId::from_uuid(id)))
        .map_err(|_| AppError::Unauthorized(format!("{ACTOR_HEADER} must be a UUID")))
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .map(|h| h.to_str().unwrap_or_default());
        parse_actor(value).map_err(ApiError::from)
    }
}
