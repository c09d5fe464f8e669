use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("age", "Age", 0.0, 1.4e10).unit("years"),
    FieldRule::number("mass", "Mass", 1e6, 1e20).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 0.01, 1000.0).unit("kms"),
    FieldRule::number("orbitalPeriod", "Orbital period", 0.1, 1e7).unit("years"),
    FieldRule::number("perihelion", "Perihelion", 0.001, 1e5).unit("AU"),
    FieldRule::number("aphelion", "Aphelion", 0.001, 1e6).unit("AU"),
    FieldRule::integer("lastSeenYear", "Last seen year", 0, 3000),
    FieldRule::uuid("starId", "Star ID"),
];

pub static COMET: ResourceDef = ResourceDef {
    table: "Comet",
    segment: "comets",
    singular: "comet",
    plural: "comets",
    version: ApiVersion::V1,
    schema: Schema::new(FIELDS),
};
