use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("age", "Age", 0.0, 1.6e10).unit("years"),
    FieldRule::number("mass", "Mass", 0.001, 1e8).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 0.001, 100.0).unit("metres"),
    FieldRule::integer("foundYear", "Found year", 0, 3000),
    FieldRule::text("location", "Location").length(2, 100),
    FieldRule::uuid("planetId", "Planet ID"),
];

pub static METEORITE: ResourceDef = ResourceDef {
    table: "Meteorite",
    segment: "meteorites",
    singular: "meteorite",
    plural: "meteorites",
    version: ApiVersion::V1_2,
    schema: Schema::new(FIELDS),
};
