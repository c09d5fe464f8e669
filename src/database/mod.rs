pub mod catalog;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod users;

pub use catalog::CatalogRepository;
pub use manager::{DatabaseError, DatabaseManager};
pub use users::UserRepository;
