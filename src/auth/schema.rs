use crate::validation::{FieldRule, Schema};

use super::Role;

const USER_FIELDS: &[FieldRule] = &[
    FieldRule::text("firstName", "First name"),
    FieldRule::text("lastName", "Last name"),
    FieldRule::email("emailAddress", "Email"),
    FieldRule::text("password", "Password"),
    FieldRule::choice("role", "Role", Role::NAMES),
    FieldRule::uuid("planetId", "Home planet ID").optional().nullable(),
];

/// Registration and full user replacement
pub static USER_SCHEMA: Schema = Schema::new(USER_FIELDS);

/// Partial user update; extra keys such as `id` are dropped
pub static USER_PATCH_SCHEMA: Schema = Schema::new(USER_FIELDS).allow_unknown();

const LOGIN_FIELDS: &[FieldRule] = &[
    FieldRule::text("emailAddress", "Email"),
    FieldRule::text("password", "Password"),
];

pub static LOGIN_SCHEMA: Schema = Schema::new(LOGIN_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Mode;
    use serde_json::json;

    #[test]
    fn registration_requires_role_and_valid_email() {
        let body = json!({
            "firstName": "Henrietta",
            "lastName": "Leavitt",
            "emailAddress": "henrietta@harvard.com",
            "password": "cepheids1912"
        });
        let err = USER_SCHEMA.validate(&body, Mode::Full).unwrap_err();
        assert_eq!(err.first_message(), "Role is required");

        let mut body = body;
        body["role"] = json!("ROOT");
        body["emailAddress"] = json!("henrietta@harvard.edu");
        let fields = USER_SCHEMA.validate(&body, Mode::Full).unwrap_err().into_field_map();
        assert_eq!(fields["emailAddress"], "Email must be a valid email address");
        assert_eq!(fields["role"], "Role must be one of the following: BASIC,NORMAL,ADMIN");
    }

    #[test]
    fn short_names_and_passwords_are_accepted() {
        let body = json!({
            "firstName": "Al",
            "lastName": "X",
            "emailAddress": "x@astro.com",
            "password": "stars",
            "role": "BASIC"
        });
        let cleaned = USER_SCHEMA.validate(&body, Mode::Full).unwrap();
        assert_eq!(cleaned["password"], "stars");

        let mut body = body;
        body["password"] = json!("");
        body["planetId"] = json!("earth");
        let fields = USER_SCHEMA.validate(&body, Mode::Full).unwrap_err().into_field_map();
        assert_eq!(fields["password"], "Password cannot be empty");
        assert_eq!(fields["planetId"], "Home planet ID should be a valid UUID");
    }

    #[test]
    fn patch_ignores_unknown_keys() {
        let cleaned = USER_PATCH_SCHEMA
            .validate(&json!({ "id": "x", "lastName": "Pickering" }), Mode::Partial)
            .unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["lastName"], "Pickering");
    }

    #[test]
    fn login_requires_both_fields() {
        let fields = LOGIN_SCHEMA
            .validate(&json!({ "emailAddress": "a@b.com" }), Mode::Full)
            .unwrap_err()
            .into_field_map();
        assert_eq!(fields["password"], "Password is required");
    }
}
