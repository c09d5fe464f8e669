// handlers/protected/users.rs - /api/v1/users (ADMIN only)

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{Map, Value};

use crate::auth::hash_password;
use crate::auth::schema::{USER_PATCH_SCHEMA, USER_SCHEMA};
use crate::catalog::Page;
use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::protected::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{Mode, Schema};

fn missing(id: &str) -> ApiError {
    ApiError::not_found(format!("No user with the id: {} found", id))
}

fn page_param(params: &HashMap<String, String>, key: &str, default: u32, max: u32) -> Result<u32, ApiError> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if (1..=max).contains(&n) => Ok(n),
            _ => Err(ApiError::bad_request(format!("Invalid {}: {}", key, raw))),
        },
    }
}

/// GET /api/v1/users
pub async fn users_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<User>> {
    let page = page_param(&params, "page", 1, u32::MAX)?;
    let amount = page_param(&params, "amount", state.pagination.default_amount, state.pagination.max_amount)?;

    let offset = i64::from(page - 1) * i64::from(amount);
    let (users, total) = UserRepository::new(state.pool.clone())
        .list(i64::from(amount), offset)
        .await?;

    if users.is_empty() {
        return Err(ApiError::not_found("No users found"));
    }
    Ok(ApiResponse::success(users).with_pagination(Page::new(page, amount, total)))
}

/// GET /api/v1/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let uuid = parse_id(&id)?;
    let user = UserRepository::new(state.pool.clone())
        .find(uuid)
        .await?
        .ok_or_else(|| missing(&id))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/users/:id
pub async fn user_put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    update(state, id, body, &USER_SCHEMA, Mode::Full).await
}

/// PATCH /api/v1/users/:id
pub async fn user_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    update(state, id, body, &USER_PATCH_SCHEMA, Mode::Partial).await
}

async fn update(
    state: AppState,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    schema: &Schema,
    mode: Mode,
) -> ApiResult<User> {
    let uuid = parse_id(&id)?;
    let Json(body) = body?;
    let mut fields = schema.validate(&body, mode)?;
    rehash_password(&mut fields).await?;
    if mode == Mode::Full {
        fields.entry("planetId".to_string()).or_insert(Value::Null);
    }

    let user = UserRepository::new(state.pool.clone())
        .update(uuid, fields)
        .await?
        .ok_or_else(|| missing(&id))?;

    Ok(ApiResponse::success(user).with_message(format!("User with the id: {} successfully updated", id)))
}

async fn rehash_password(fields: &mut Map<String, Value>) -> Result<(), ApiError> {
    if let Some(Value::String(plain)) = fields.get("password") {
        let hash = hash_password(plain).await?;
        fields.insert("password".to_string(), Value::String(hash));
    }
    Ok(())
}

/// DELETE /api/v1/users/:id
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let uuid = parse_id(&id)?;
    if !UserRepository::new(state.pool.clone()).delete(uuid).await? {
        return Err(missing(&id));
    }
    Ok(ApiResponse::success(Value::Null).with_message(format!("User with the id: {} successfully deleted", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_are_bounded() {
        let params: HashMap<String, String> = [("amount".to_string(), "500".to_string())].into();
        assert!(page_param(&params, "amount", 25, 100).is_err());
        assert_eq!(page_param(&params, "page", 1, u32::MAX).unwrap(), 1);
    }

    #[tokio::test]
    async fn passwords_are_rehashed() {
        let mut fields = Map::new();
        fields.insert("password".into(), Value::String("stardust42".into()));
        rehash_password(&mut fields).await.unwrap();
        let stored = fields["password"].as_str().unwrap();
        assert!(stored.starts_with("$2"));
        assert!(crate::auth::verify_password("stardust42", stored).await);
    }
}
