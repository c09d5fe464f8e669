use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::repository;
use crate::catalog::ResourceDef;
use crate::error::ApiError;
use crate::handlers::protected::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Mode;

fn missing(def: &ResourceDef, id: &str) -> ApiError {
    ApiError::not_found(format!("No {} with the id: {} found", def.singular, id))
}

/// GET /{resource}/:id
pub async fn record_get(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let uuid = parse_id(&id)?;
    let row = repository(def, &state).find(uuid).await?.ok_or_else(|| missing(def, &id))?;
    Ok(ApiResponse::success(row))
}

/// PUT /{resource}/:id - full replacement
pub async fn record_put(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, def, id, body, Mode::Full).await
}

/// PATCH /{resource}/:id - partial update
pub async fn record_patch(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, def, id, body, Mode::Partial).await
}

async fn update(
    state: AppState,
    def: &'static ResourceDef,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: Mode,
) -> ApiResult<Value> {
    let uuid = parse_id(&id)?;
    let Json(body) = body?;
    let fields = def.schema.validate(&body, mode)?;

    let row = repository(def, &state)
        .update(uuid, fields, mode)
        .await?
        .ok_or_else(|| missing(def, &id))?;

    Ok(ApiResponse::success(row).with_message(format!("{} with the id: {} successfully updated", def.title(), id)))
}

/// DELETE /{resource}/:id
pub async fn record_delete(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let uuid = parse_id(&id)?;
    if !repository(def, &state).delete(uuid).await? {
        return Err(missing(def, &id));
    }
    tracing::info!("Deleted {} {}", def.singular, id);
    Ok(ApiResponse::success(Value::Null).with_message(format!("{} with the id: {} successfully deleted", def.title(), id)))
}

/// HEAD /{resource}/:id
pub async fn record_head(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = parse_id(&id)?;
    if repository(def, &state).exists(uuid).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing(def, &id))
    }
}
