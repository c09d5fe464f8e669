use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::repository;
use crate::catalog::{ListQuery, Page, ResourceDef};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Mode;

/// GET /{resource} - filtered, sorted, paginated list
pub async fn collection_list(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    let query = ListQuery::parse(def, &params, &state.pagination)?;
    let (rows, total) = repository(def, &state).list(&query).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found(format!("No {} found", def.plural)));
    }

    Ok(ApiResponse::success(rows).with_pagination(Page::new(query.page, query.amount, total)))
}

/// POST /{resource}
pub async fn collection_post(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let fields = def.schema.validate(&body, Mode::Full)?;
    let created = repository(def, &state).insert(fields).await?;

    tracing::info!("Created {} {}", def.singular, created["id"]);
    Ok(ApiResponse::created(created).with_message(format!("{} successfully created", def.title())))
}

/// HEAD /{resource} - 204 when at least one row exists
pub async fn collection_head(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
) -> Result<StatusCode, ApiError> {
    if repository(def, &state).any().await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("No {} found", def.plural)))
    }
}
