use super::{ApiVersion, ResourceDef};
use crate::validation::{FieldRule, Schema};

pub const SPECTRAL_CLASSES: &[&str] = &["O", "B", "A", "F", "G", "K", "M"];

const FIELDS: &[FieldRule] = &[
    FieldRule::text("name", "Name").length(3, 100),
    FieldRule::number("age", "Age", 0.0, 1.4e10).unit("years"),
    FieldRule::number("mass", "Mass", 1e26, 3e32).unit("kgs"),
    FieldRule::number("diameter", "Diameter", 1.0, 3e9).unit("kms"),
    FieldRule::number("temperature", "Temperature", 500.0, 100000.0).unit("kelvin"),
    FieldRule::number("luminosity", "Luminosity", 0.0, 1e7).unit("solar luminosities"),
    FieldRule::choice("spectralClass", "Spectral class", SPECTRAL_CLASSES),
];

pub static STAR: ResourceDef = ResourceDef {
    table: "Star",
    segment: "stars",
    singular: "star",
    plural: "stars",
    version: ApiVersion::V1,
    schema: Schema::new(FIELDS),
};
