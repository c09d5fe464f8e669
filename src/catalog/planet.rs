use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("age", "Age", 0.0, 1.4e10).unit("years"),
    FieldRule::number("mass", "Mass", 1e20, 2e28).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 100.0, 500000.0).unit("kms"),
    FieldRule::number("density", "Density", 0.1, 30.0).unit("g/cm3"),
    FieldRule::number("orbitalPeriod", "Orbital period", 0.1, 1e6).unit("days"),
    FieldRule::integer("moons", "Moons", 0, 300),
    FieldRule::boolean("isHabitable", "Is habitable"),
    FieldRule::uuid("starId", "Star ID"),
];

pub static PLANET: ResourceDef = ResourceDef {
    table: "Planet",
    segment: "planets",
    singular: "planet",
    plural: "planets",
    version: ApiVersion::V1,
    schema: Schema::new(FIELDS),
};
