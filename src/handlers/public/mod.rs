// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and service discovery. Auth endpoints are still rate
// limited under the `auth` class.

pub mod auth;
pub mod system;
