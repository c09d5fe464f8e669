//! Static descriptions of the catalog resources.
//!
//! Each resource is a [`ResourceDef`]: table, route segment, nouns used in
//! response messages, the API version that introduced it and the validation
//! schema for its writable columns. Handlers and the repository are generic
//! over these definitions.

mod asteroid;
mod comet;
mod meteorite;
mod planet;
mod query;
mod satellite;
mod star;

pub use asteroid::ASTEROID;
pub use comet::COMET;
pub use meteorite::METEORITE;
pub use planet::PLANET;
pub use query::{ListQuery, Page};
pub use satellite::SATELLITE;
pub use star::STAR;

use crate::filter::ColumnCasts;
use crate::validation::{FieldRule, Schema};

/// Columns every catalog table carries besides its schema fields
pub const SYSTEM_COLUMNS: &[&str] = &["id", "createdAt", "updatedAt"];

/// API generation a resource was published under. Later generations expose
/// PATCH, HEAD and OPTIONS; v1.2 also gives HEAD its own rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V1_1,
    V1_2,
}

impl ApiVersion {
    pub fn prefix(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "/api/v1",
            ApiVersion::V1_1 => "/api/v1.1",
            ApiVersion::V1_2 => "/api/v1.2",
        }
    }

    pub fn supports_patch(&self) -> bool {
        !matches!(self, ApiVersion::V1)
    }

    pub fn supports_head(&self) -> bool {
        !matches!(self, ApiVersion::V1)
    }

    pub fn supports_options(&self) -> bool {
        !matches!(self, ApiVersion::V1)
    }

    pub fn has_head_limit(&self) -> bool {
        matches!(self, ApiVersion::V1_2)
    }
}

#[derive(Debug)]
pub struct ResourceDef {
    pub table: &'static str,
    pub segment: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub version: ApiVersion,
    pub schema: Schema,
}

impl ResourceDef {
    /// Collection route, e.g. `/api/v1.1/asteroids`
    pub fn path(&self) -> String {
        format!("{}/{}", self.version.prefix(), self.segment)
    }

    /// Singular noun with a leading capital, for response messages
    pub fn title(&self) -> String {
        let mut chars = self.singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn fields(&self) -> &'static [FieldRule] {
        self.schema.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldRule> {
        self.schema.field(name)
    }

    pub fn is_sortable(&self, column: &str) -> bool {
        SYSTEM_COLUMNS.contains(&column) || self.field(column).is_some()
    }

    /// Parameter casts for every column, used when binding JSON values
    pub fn casts(&self) -> ColumnCasts {
        let mut casts = ColumnCasts::new();
        casts.insert("id".to_string(), "uuid");
        casts.insert("createdAt".to_string(), "timestamptz");
        casts.insert("updatedAt".to_string(), "timestamptz");
        for field in self.fields() {
            casts.insert(field.name.to_string(), field.kind.sql_cast());
        }
        casts
    }
}

/// Every published catalog resource
pub static CATALOG: [&ResourceDef; 6] = [&STAR, &PLANET, &COMET, &ASTEROID, &SATELLITE, &METEORITE];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::is_valid_identifier;

    #[test]
    fn paths_follow_versions() {
        assert_eq!(STAR.path(), "/api/v1/stars");
        assert_eq!(ASTEROID.path(), "/api/v1.1/asteroids");
        assert_eq!(METEORITE.path(), "/api/v1.2/meteorites");
    }

    #[test]
    fn version_capabilities() {
        assert!(!ApiVersion::V1.supports_patch());
        assert!(ApiVersion::V1_1.supports_head() && !ApiVersion::V1_1.has_head_limit());
        assert!(ApiVersion::V1_2.has_head_limit());
    }

    #[test]
    fn every_definition_uses_safe_identifiers() {
        for def in CATALOG {
            assert!(is_valid_identifier(def.table), "{}", def.table);
            for field in def.fields() {
                assert!(is_valid_identifier(field.name), "{}.{}", def.table, field.name);
            }
        }
    }

    #[test]
    fn sortable_columns_include_system_columns() {
        assert!(COMET.is_sortable("id"));
        assert!(COMET.is_sortable("perihelion"));
        assert!(!COMET.is_sortable("password"));
        assert_eq!(SATELLITE.title(), "Satellite");
    }

    #[test]
    fn casts_cover_foreign_keys() {
        let casts = PLANET.casts();
        assert_eq!(casts["starId"], "uuid");
        assert_eq!(casts["moons"], "integer");
        assert_eq!(casts["isHabitable"], "boolean");
    }
}
