// Request authentication.
//
// Sessions are verified upstream; by the time a request reaches us the
// gateway has put the signed-in user's id in `X-User-Id`. The cron trigger
// is separate and checks a shared secret instead.

use super::api_error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use subtle::ConstantTimeEq;

pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

/// The signed-in user. Rejects with 401 when there is none.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub i64);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(&parts.headers)
            .map(CallerId)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<i64>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(user_id(&parts.headers)))
    }
}

/// Whether the request carries `Authorization: Bearer <secret>`.
///
/// With no secret configured nothing is authorized.
pub fn authorize_cron(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let secret = match secret.filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => return false,
    };
    let provided = match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => return false,
    };

    let expected = format!("Bearer {}", secret);
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
