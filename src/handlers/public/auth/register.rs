// handlers/public/auth/register.rs - POST /api/v1/auth/register

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;

use super::utils::{new_user_from_fields, string_field};
use crate::auth::{hash_password, schema::USER_SCHEMA};
use crate::database::models::User;
use crate::database::users::DUPLICATE_EMAIL;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Mode;

/// Create an account. The caller picks the role; emails must be unique.
pub async fn register_post(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = body?;
    let fields = USER_SCHEMA.validate(&body, Mode::Full)?;

    let users = UserRepository::new(state.pool.clone());
    let email = string_field(&fields, "emailAddress")?;
    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict(DUPLICATE_EMAIL));
    }

    let password_hash = hash_password(&string_field(&fields, "password")?).await?;
    let user = users.insert(new_user_from_fields(&fields, password_hash)?).await?;

    info!("Registered user {} with role {}", user.email_address, user.role);
    Ok(ApiResponse::created(user).with_message("User successfully registered"))
}
