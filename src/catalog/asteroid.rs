use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

pub const ASTEROID_TYPES: &[&str] = &["C_TYPE", "S_TYPE", "M_TYPE"];
pub const LOCATIONS: &[&str] = &["ASTEROID_BELT", "KUIPER_BELT", "TROJAN", "NEAR_EARTH", "OORT_CLOUD"];

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("age", "Age", 0.0, 1.6e10).unit("years"),
    FieldRule::number("mass", "Mass", 1.6e10, 3e20).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 0.0001, 1000.0).unit("kms"),
    FieldRule::number("density", "Density", 0.1, 4.0).unit("kg/m3"),
    FieldRule::choice("type", "Type", ASTEROID_TYPES),
    FieldRule::number("year", "Year", 0.0, 1000.0).unit("years"),
    FieldRule::number("perigee", "Perigee", 0.1, 100000.0).unit("AU"),
    FieldRule::number("apogee", "Apogee", 0.34, 100000.0).unit("AU"),
    FieldRule::choice("location", "Location", LOCATIONS),
    FieldRule::number("brightness", "Brightness", -32.0, 32.0),
    FieldRule::uuid("starId", "Star ID"),
];

pub static ASTEROID: ResourceDef = ResourceDef {
    table: "Asteroid",
    segment: "asteroids",
    singular: "asteroid",
    plural: "asteroids",
    version: ApiVersion::V1_1,
    schema: Schema::new(FIELDS),
};
