// handlers/protected/catalog/mod.rs - CRUD for every catalog resource
//
// Handlers are generic over the `ResourceDef` injected as a request
// extension by the resource's router.

pub mod collection;
pub mod options;
pub mod record;

pub use collection::{collection_head, collection_list, collection_post};
pub use options::{collection_options, record_options};
pub use record::{record_delete, record_get, record_head, record_patch, record_put};

use crate::catalog::ResourceDef;
use crate::database::CatalogRepository;
use crate::state::AppState;

pub(crate) fn repository(def: &'static ResourceDef, state: &AppState) -> CatalogRepository {
    CatalogRepository::new(def, state.pool.clone())
}
