pub mod auth;
pub mod authorize;
pub mod rate_limit;
pub mod response;

pub use auth::{authenticate, AuthUser};
pub use authorize::require_role;
pub use rate_limit::{rate_limit, RateLimiter, RateLimits};
pub use response::{ApiResponse, ApiResult};
