use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::auth::{verify_token, Claims, Role};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    fn from_claims(claims: Claims, token: String) -> Self {
        Self {
            id: claims.sub,
            expires_at: claims.expires_at(),
            email: claims.email,
            role: claims.role,
            token,
        }
    }
}

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Bearer-token authentication. Revoked tokens are refused before the
/// signature is even checked; any other failure is a plain 403.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| ApiError::forbidden("No token provided"))?;

    let revoked = state.blacklist.is_revoked(&token).await.map_err(|e| {
        error!("Blacklist lookup failed: {}", e);
        ApiError::forbidden(NOT_AUTHORIZED)
    })?;
    if revoked {
        warn!("Revoked token presented for {}", request.uri().path());
        return Err(ApiError::unauthorized("Token has been revoked. Please login again."));
    }

    let claims = verify_token(&state.jwt, &token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::forbidden(NOT_AUTHORIZED)
    })?;

    request.extensions_mut().insert(AuthUser::from_claims(claims, token));
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }
}
