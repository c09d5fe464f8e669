// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) and protected (bearer token plus role check). Route
// wiring and middleware order live in `crate::routes`.

pub mod protected;
pub mod public;
