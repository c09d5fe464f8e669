use axum::{extract::State, Extension};
use serde_json::Value;
use tracing::info;

use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /api/v1/auth/logout - revoke the presented token
pub async fn logout_post(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    state.blacklist.revoke(&auth.token, auth.expires_at).await?;
    info!("{} logged out", auth.email);
    Ok(ApiResponse::success(Value::Null).with_message("Successfully logged out"))
}

/// GET /api/v1/auth/whoami - the account behind the token
pub async fn whoami_get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    let user = UserRepository::new(state.pool.clone())
        .find(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user with the id: {} found", auth.id)))?;
    Ok(ApiResponse::success(user))
}
