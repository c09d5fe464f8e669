use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, head, options, patch, post, put, MethodRouter},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Role;
use crate::catalog::{ResourceDef, CATALOG};
use crate::handlers::{protected, public};
use crate::middleware::authorize::{ADMINS, ANY_ROLE, WRITERS};
use crate::middleware::{authenticate, rate_limit, require_role, RateLimiter};
use crate::state::AppState;

/// Rate limit, then authenticate, then check the caller's role
fn guarded(route: MethodRouter<AppState>, state: &AppState, limiter: &Arc<RateLimiter>, roles: &'static [Role]) -> MethodRouter<AppState> {
    route.route_layer(
        ServiceBuilder::new()
            .layer(from_fn_with_state(limiter.clone(), rate_limit))
            .layer(from_fn_with_state(state.clone(), authenticate))
            .layer(from_fn_with_state(roles, require_role)),
    )
}

fn limited(route: MethodRouter<AppState>, limiter: &Arc<RateLimiter>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(limiter.clone(), rate_limit))
}

/// All routes of one catalog resource, shaped by its API version
fn resource_routes(def: &'static ResourceDef, state: &AppState) -> Router<AppState> {
    use protected::catalog::*;

    let limits = &state.limits;
    let collection = def.path();
    let record = format!("{}/:id", collection);

    let mut router = Router::new()
        .route(&collection, guarded(get(collection_list), state, &limits.get, ANY_ROLE))
        .route(&collection, guarded(post(collection_post), state, &limits.cud, WRITERS))
        .route(&record, guarded(get(record_get), state, &limits.get, ANY_ROLE))
        .route(&record, guarded(put(record_put), state, &limits.cud, WRITERS))
        .route(&record, guarded(delete(record_delete), state, &limits.cud, ADMINS));

    let version = def.version;
    if version.supports_patch() {
        router = router.route(&record, guarded(patch(record_patch), state, &limits.cud, WRITERS));
    }
    if version.supports_head() {
        let head_limit = if version.has_head_limit() { &limits.head } else { &limits.get };
        router = router
            .route(&collection, guarded(head(collection_head), state, head_limit, ANY_ROLE))
            .route(&record, guarded(head(record_head), state, head_limit, ANY_ROLE));
    }

    router.layer(Extension(def))
}

/// Explicit OPTIONS answers. These stay outside the CORS layer, which would
/// otherwise treat every OPTIONS request as a preflight.
fn options_routes(def: &'static ResourceDef, state: &AppState) -> Router<AppState> {
    use protected::catalog::{collection_options, record_options};

    let collection = def.path();
    let record = format!("{}/:id", collection);
    let limiter = &state.limits.options;

    if !def.version.supports_options() {
        return Router::new();
    }
    Router::new()
        .route(&collection, limited(options(collection_options), limiter))
        .route(&record, limited(options(record_options), limiter))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use protected::auth::{logout_post, whoami_get};
    use public::auth::{login_post, register_post};

    let limits = &state.limits;
    Router::new()
        .route("/api/v1/auth/register", limited(post(register_post), &limits.auth))
        .route("/api/v1/auth/login", limited(post(login_post), &limits.auth))
        .route("/api/v1/auth/logout", guarded(post(logout_post), state, &limits.cud, ANY_ROLE))
        .route("/api/v1/auth/whoami", guarded(get(whoami_get), state, &limits.get, ANY_ROLE))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use protected::users::*;

    let limits = &state.limits;
    Router::new()
        .route("/api/v1/users", guarded(get(users_list), state, &limits.get, ADMINS))
        .route("/api/v1/users/:id", guarded(get(user_get), state, &limits.get, ADMINS))
        .route("/api/v1/users/:id", guarded(put(user_put), state, &limits.cud, ADMINS))
        .route("/api/v1/users/:id", guarded(patch(user_patch), state, &limits.cud, ADMINS))
        .route("/api/v1/users/:id", guarded(delete(user_delete), state, &limits.cud, ADMINS))
}

fn cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(Any)
}

/// The complete application router
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let mut api = Router::new()
        .route("/", get(public::system::root))
        .route("/api", get(public::system::api_index))
        .route("/health", get(public::system::health))
        .merge(auth_routes(&state))
        .merge(user_routes(&state));
    let mut preflight = Router::new();

    for def in CATALOG {
        api = api.merge(resource_routes(def, &state));
        preflight = preflight.merge(options_routes(def, &state));
    }

    api.layer(cors(cors_origins))
        .merge(preflight)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
