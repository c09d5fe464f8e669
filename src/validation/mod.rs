//! Declarative request-body validation.
//!
//! A [`Schema`] is a static list of [`FieldRule`]s. Validation walks the rules in
//! declaration order, coerces values the way a form-oriented client expects
//! (numeric strings become numbers, `"true"` becomes `true`) and returns the
//! cleaned object. Every failing field is reported; the first one becomes the
//! headline message.

mod error;
mod rules;

pub use error::{FieldError, ValidationErrors};
pub use rules::{FieldKind, FieldRule};

use serde_json::{Map, Value};

/// Whether every required field must be present (POST/PUT) or any subset of
/// fields may be sent (PATCH).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [FieldRule],
    /// Unknown keys are dropped instead of rejected
    pub allow_unknown: bool,
}

impl Schema {
    pub const fn new(fields: &'static [FieldRule]) -> Self {
        Self { fields, allow_unknown: false }
    }

    pub const fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn validate(&self, body: &Value, mode: Mode) -> Result<Map<String, Value>, ValidationErrors> {
        let obj = body
            .as_object()
            .ok_or_else(|| ValidationErrors::single("body", "Request body must be an object"))?;

        let mut errors = ValidationErrors::default();
        let mut cleaned = Map::new();

        for rule in self.fields {
            match obj.get(rule.name) {
                Some(value) => match rule.check(value) {
                    Ok(v) => {
                        cleaned.insert(rule.name.to_string(), v);
                    }
                    Err(message) => errors.push(rule.name, message),
                },
                None if rule.required && mode == Mode::Full => {
                    errors.push(rule.name, format!("{} is required", rule.label));
                }
                None => {}
            }
        }

        if !self.allow_unknown {
            for key in obj.keys() {
                if self.field(key).is_none() {
                    errors.push(key, format!("\"{}\" is not allowed", key));
                }
            }
        }

        if mode == Mode::Partial && errors.is_empty() && cleaned.is_empty() {
            errors.push("body", "Request body must contain at least one field");
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldRule] = &[
        FieldRule::text("name", "Name").length(3, 100),
        FieldRule::number("mass", "Mass", 1.6e10, 3e20).unit("kgs"),
        FieldRule::integer("year", "Year", 0, 1000).unit("years"),
        FieldRule::choice("type", "Type", &["C_TYPE", "S_TYPE", "M_TYPE"]),
        FieldRule::uuid("starId", "Star ID"),
        FieldRule::integer("launchYear", "Launch year", 1957, 3000).optional().nullable(),
    ];
    static SCHEMA: Schema = Schema::new(FIELDS);

    fn valid_body() -> Value {
        json!({
            "name": "Ceres",
            "mass": 9.39e18,
            "year": 801,
            "type": "C_TYPE",
            "starId": "4F9D0C3E-5D1C-4B43-9D55-0C0F3A1F4B2A"
        })
    }

    #[test]
    fn full_mode_accepts_valid_body_and_normalizes() {
        let mut body = valid_body();
        body["year"] = json!("802");
        let cleaned = SCHEMA.validate(&body, Mode::Full).unwrap();
        assert_eq!(cleaned["year"], json!(802));
        assert_eq!(cleaned["starId"], json!("4f9d0c3e-5d1c-4b43-9d55-0c0f3a1f4b2a"));
        assert!(!cleaned.contains_key("launchYear"));
    }

    #[test]
    fn full_mode_reports_missing_fields_in_schema_order() {
        let err = SCHEMA.validate(&json!({ "type": "C_TYPE" }), Mode::Full).unwrap_err();
        assert_eq!(err.first_message(), "Name is required");
        let fields = err.into_field_map();
        assert_eq!(fields["mass"], "Mass is required");
        assert_eq!(fields["starId"], "Star ID is required");
        assert!(!fields.contains_key("launchYear"));
    }

    #[test]
    fn range_messages_include_limits_and_units() {
        let mut body = valid_body();
        body["mass"] = json!(5);
        body["year"] = json!(1001);
        let fields = SCHEMA.validate(&body, Mode::Full).unwrap_err().into_field_map();
        assert_eq!(fields["mass"], "Mass should be greater than or equal to 16000000000 kgs");
        assert_eq!(fields["year"], "Year should be lesser than or equal to 1000 years");
    }

    #[test]
    fn text_and_choice_messages() {
        let mut body = valid_body();
        body["name"] = json!("Ce");
        body["type"] = json!("X_TYPE");
        let fields = SCHEMA.validate(&body, Mode::Full).unwrap_err().into_field_map();
        assert_eq!(fields["name"], "Name should have a minimum length of 3");
        assert_eq!(fields["type"], "Type must be one of the following: C_TYPE,S_TYPE,M_TYPE");

        body["name"] = json!("");
        let err = SCHEMA.validate(&body, Mode::Full).unwrap_err();
        assert_eq!(err.first_message(), "Name cannot be empty");
    }

    #[test]
    fn unknown_keys_are_rejected_unless_allowed() {
        let mut body = valid_body();
        body["colour"] = json!("grey");
        let err = SCHEMA.validate(&body, Mode::Full).unwrap_err();
        assert_eq!(err.first_message(), "\"colour\" is not allowed");

        static LENIENT: Schema = Schema::new(FIELDS).allow_unknown();
        let cleaned = LENIENT.validate(&body, Mode::Full).unwrap();
        assert!(!cleaned.contains_key("colour"));
    }

    #[test]
    fn partial_mode_requires_at_least_one_field() {
        let err = SCHEMA.validate(&json!({}), Mode::Partial).unwrap_err();
        assert_eq!(err.first_message(), "Request body must contain at least one field");

        let cleaned = SCHEMA.validate(&json!({ "year": 12 }), Mode::Partial).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn nullable_fields_accept_null_only_when_declared() {
        let cleaned = SCHEMA.validate(&json!({ "launchYear": null }), Mode::Partial).unwrap();
        assert_eq!(cleaned["launchYear"], Value::Null);

        let err = SCHEMA.validate(&json!({ "year": null }), Mode::Partial).unwrap_err();
        assert_eq!(err.first_message(), "Year should be a number");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = SCHEMA.validate(&json!([1, 2]), Mode::Full).unwrap_err();
        assert_eq!(err.first_message(), "Request body must be an object");
    }
}
