use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::catalog::CATALOG;
use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Astronomy Catalog API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Catalog of stars, planets, comets, asteroids, satellites and meteorites",
            "index": "/api",
            "health": "/health",
        }
    }))
}

/// GET /api - every versioned route
pub async fn api_index() -> Json<Value> {
    let resources: Vec<Value> = CATALOG
        .iter()
        .map(|def| {
            let version = def.version;
            let mut methods = vec!["GET", "POST", "PUT", "DELETE"];
            if version.supports_patch() {
                methods.push("PATCH");
            }
            if version.supports_head() {
                methods.push("HEAD");
            }
            if version.supports_options() {
                methods.push("OPTIONS");
            }
            json!({
                "resource": def.plural,
                "path": def.path(),
                "methods": methods,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "auth": {
                "register": "/api/v1/auth/register",
                "login": "/api/v1/auth/login",
                "logout": "/api/v1/auth/logout",
                "whoami": "/api/v1/auth/whoami",
            },
            "users": "/api/v1/users",
            "resources": resources,
        }
    }))
}

/// GET /health - 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
