use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

pub const ANY_ROLE: &[Role] = &[Role::Basic, Role::Normal, Role::Admin];
pub const WRITERS: &[Role] = &[Role::Normal, Role::Admin];
pub const ADMINS: &[Role] = &[Role::Admin];

/// Role gate; must run inside [`crate::middleware::auth::authenticate`]
pub async fn require_role(State(allowed): State<&'static [Role]>, request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::forbidden("Not authorized to access this route"));
    };

    if !allowed.contains(&user.role) {
        warn!("{} ({}) denied {} {}", user.email, user.role, request.method(), request.uri().path());
        return Err(ApiError::forbidden("Not authorized to perform this action"));
    }

    Ok(next.run(request).await)
}
