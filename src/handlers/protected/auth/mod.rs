// handlers/protected/auth/mod.rs - Session endpoints for authenticated users

pub mod session;

pub use session::{logout_post, whoami_get};
