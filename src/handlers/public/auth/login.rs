// handlers/public/auth/login.rs - POST /api/v1/auth/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::utils::string_field;
use crate::auth::{issue_token, schema::LOGIN_SCHEMA, verify_password};
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Mode;

const BAD_CREDENTIALS: &str = "Invalid email address or password";

/// Exchange email and password for a bearer token
pub async fn login_post(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = body?;
    let fields = LOGIN_SCHEMA.validate(&body, Mode::Full)?;
    let email = string_field(&fields, "emailAddress")?;
    let password = string_field(&fields, "password")?;

    let Some(user) = UserRepository::new(state.pool.clone()).find_by_email(&email).await? else {
        warn!("Login attempt for unknown email {}", email);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(&password, &user.password).await {
        warn!("Failed login for {}", email);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let (token, expires_at) = issue_token(&state.jwt, &user)?;
    info!("{} logged in", user.email_address);

    Ok(ApiResponse::success(json!({
        "token": token,
        "expiresAt": expires_at,
        "user": user,
    }))
    .with_message(format!("{} has successfully logged in", user.full_name())))
}
