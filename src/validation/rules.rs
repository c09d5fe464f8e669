use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use uuid::Uuid;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[a-z]+\.com$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { min: Option<usize>, max: Option<usize> },
    Number { min: f64, max: f64 },
    Integer { min: i64, max: i64 },
    Boolean,
    Choice(&'static [&'static str]),
    Uuid,
    Email,
}

impl FieldKind {
    /// Postgres type used when binding a value of this kind
    pub fn sql_cast(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } | FieldKind::Choice(_) | FieldKind::Email => "text",
            FieldKind::Number { .. } => "double precision",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Uuid => "uuid",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text { .. } | FieldKind::Email)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub unit: &'static str,
}

impl FieldRule {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true, nullable: false, unit: "" }
    }

    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text { min: None, max: None })
    }

    pub const fn number(name: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self::new(name, label, FieldKind::Number { min, max })
    }

    pub const fn integer(name: &'static str, label: &'static str, min: i64, max: i64) -> Self {
        Self::new(name, label, FieldKind::Integer { min, max })
    }

    pub const fn boolean(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Boolean)
    }

    pub const fn choice(name: &'static str, label: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, label, FieldKind::Choice(values))
    }

    pub const fn uuid(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Uuid)
    }

    pub const fn email(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.kind = FieldKind::Text { min: Some(min), max: Some(max) };
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Check one value against this rule, returning the coerced value
    pub fn check(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }

        match self.kind {
            FieldKind::Text { min, max } => {
                let s = self.expect_string(value)?;
                let len = s.chars().count();
                if let Some(min) = min {
                    if len < min {
                        return Err(format!("{} should have a minimum length of {}", self.label, min));
                    }
                }
                if let Some(max) = max {
                    if len > max {
                        return Err(format!("{} should have a maximum length of {}", self.label, max));
                    }
                }
                Ok(Value::String(s.to_string()))
            }
            FieldKind::Number { min, max } => {
                let n = self.expect_number(value)?;
                self.check_range(n, min, max)?;
                Ok(Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null))
            }
            FieldKind::Integer { min, max } => {
                let n = self.expect_number(value)?;
                if n.fract() != 0.0 {
                    return Err(format!("{} should be an integer", self.label));
                }
                self.check_range(n, min as f64, max as f64)?;
                Ok(Value::from(n as i64))
            }
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(format!("{} should be a boolean", self.label)),
            },
            FieldKind::Choice(values) => {
                let s = self.expect_string(value)?;
                if values.contains(&s) {
                    Ok(Value::String(s.to_string()))
                } else {
                    Err(format!("{} must be one of the following: {}", self.label, values.join(",")))
                }
            }
            FieldKind::Uuid => {
                let s = self.expect_string(value)?;
                Uuid::parse_str(s)
                    .map(|id| Value::String(id.to_string()))
                    .map_err(|_| format!("{} should be a valid UUID", self.label))
            }
            FieldKind::Email => {
                let s = self.expect_string(value)?;
                if EMAIL_PATTERN.is_match(s) {
                    Ok(Value::String(s.to_string()))
                } else {
                    Err(format!("{} must be a valid email address", self.label))
                }
            }
        }
    }

    fn expect_string<'v>(&self, value: &'v Value) -> Result<&'v str, String> {
        match value {
            Value::String(s) if s.is_empty() => Err(format!("{} cannot be empty", self.label)),
            Value::String(s) => Ok(s),
            _ => Err(format!("{} should be a string", self.label)),
        }
    }

    fn expect_number(&self, value: &Value) -> Result<f64, String> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };
        parsed.ok_or_else(|| format!("{} should be a number", self.label))
    }

    fn check_range(&self, n: f64, min: f64, max: f64) -> Result<(), String> {
        if n < min {
            return Err(self.with_unit(format!("{} should be greater than or equal to {}", self.label, min)));
        }
        if n > max {
            return Err(self.with_unit(format!("{} should be lesser than or equal to {}", self.label, max)));
        }
        Ok(())
    }

    fn with_unit(&self, message: String) -> String {
        if self.unit.is_empty() {
            message
        } else {
            format!("{} {}", message, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_pattern_matches_dot_com_addresses_only() {
        let rule = FieldRule::email("emailAddress", "Email");
        assert!(rule.check(&json!("ada.lovelace+1@example.com")).is_ok());
        assert_eq!(
            rule.check(&json!("ada@example.org")).unwrap_err(),
            "Email must be a valid email address"
        );
        assert!(rule.check(&json!("ada@Example.com")).is_err());
    }

    #[test]
    fn numbers_render_limits_without_exponents() {
        let rule = FieldRule::number("diameter", "Diameter", 0.0001, 1000.0).unit("kms");
        assert_eq!(
            rule.check(&json!(0.00001)).unwrap_err(),
            "Diameter should be greater than or equal to 0.0001 kms"
        );
        let rule = FieldRule::number("brightness", "Brightness", -32.0, 32.0);
        assert_eq!(
            rule.check(&json!(40)).unwrap_err(),
            "Brightness should be lesser than or equal to 32"
        );
    }

    #[test]
    fn integers_reject_fractions_and_accept_numeric_strings() {
        let rule = FieldRule::integer("moons", "Moons", 0, 300);
        assert_eq!(rule.check(&json!(2.5)).unwrap_err(), "Moons should be an integer");
        assert_eq!(rule.check(&json!("14")).unwrap(), json!(14));
        assert_eq!(rule.check(&json!("many")).unwrap_err(), "Moons should be a number");
    }

    #[test]
    fn booleans_accept_string_forms() {
        let rule = FieldRule::boolean("isHabitable", "Is habitable");
        assert_eq!(rule.check(&json!("TRUE")).unwrap(), json!(true));
        assert_eq!(rule.check(&json!(false)).unwrap(), json!(false));
        assert!(rule.check(&json!(1)).is_err());
    }

    #[test]
    fn sql_casts_follow_kind() {
        assert_eq!(FieldKind::Uuid.sql_cast(), "uuid");
        assert_eq!(FieldKind::Integer { min: 0, max: 1 }.sql_cast(), "integer");
        assert_eq!(FieldKind::Choice(&["A"]).sql_cast(), "text");
    }
}
