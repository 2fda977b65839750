//! Caller identification.
//!
//! A request is authenticated when `x-user-id` names a user whose stored API
//! token matches the presented one (`x-api-key` or `Authorization: Bearer`).
//! Tokens are compared in constant time to mitigate timing attacks. Bad or
//! missing credentials make the caller anonymous; handlers decide whether that
//! matters.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Header carrying the user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header set by reverse proxies with the original client address.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(User),
}

impl Caller {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Authenticated(user) => Some(user),
            Caller::Anonymous => None,
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((user_id, token)) = credentials(&parts.headers) else {
            return Ok(Caller::Anonymous);
        };

        let Some(expected) = state.store.get_api_token(user_id).await? else {
            return Ok(Caller::Anonymous);
        };

        if !constant_time_compare(&token, &expected) {
            tracing::debug!(user_id, "Rejected API token");
            return Ok(Caller::Anonymous);
        }

        Ok(state
            .store
            .get_user(user_id)
            .await?
            .map(Caller::Authenticated)
            .unwrap_or(Caller::Anonymous))
    }
}

/// Best-effort client address for stored comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(client_ip(&parts.headers, peer)))
    }
}

/// The first `X-Forwarded-For` entry if present, else the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Extract the user ID and presented token from the request headers.
fn credentials(headers: &HeaderMap) -> Option<(i64, String)> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())?;

    let token = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            // Also check Authorization header as bearer token
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })?;

    Some((user_id, token.to_string()))
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
