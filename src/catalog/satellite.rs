use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

pub const SATELLITE_TYPES: &[&str] = &["NATURAL", "ARTIFICIAL"];

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("mass", "Mass", 1.0, 2e23).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 0.001, 6000.0).unit("kms"),
    FieldRule::number("orbitalPeriod", "Orbital period", 0.001, 100000.0).unit("days"),
    FieldRule::choice("type", "Type", SATELLITE_TYPES),
    FieldRule::integer("launchYear", "Launch year", 1957, 3000).optional().nullable(),
    FieldRule::uuid("planetId", "Planet ID"),
];

pub static SATELLITE: ResourceDef = ResourceDef {
    table: "Satellite",
    segment: "satellites",
    singular: "satellite",
    plural: "satellites",
    version: ApiVersion::V1_1,
    schema: Schema::new(FIELDS),
};
