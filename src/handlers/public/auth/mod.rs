// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login; // POST /api/v1/auth/login
pub mod register; // POST /api/v1/auth/register
mod utils;

pub use login::login_post;
pub use register::register_post;
