// handlers/protected/mod.rs - Handlers behind bearer-token authentication
//
// Every route here is wrapped, outermost first, in: rate limit, authenticate,
// role check. The catalog OPTIONS handlers are the exception and only get
// the rate limit.

pub mod auth;
pub mod catalog;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids must be UUIDs
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
