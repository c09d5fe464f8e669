use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::NewUser;
use crate::error::ApiError;

pub(super) fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", key)))
}

/// Build the row to insert from a body that already passed the user schema
pub(super) fn new_user_from_fields(fields: &Map<String, Value>, password_hash: String) -> Result<NewUser, ApiError> {
    let role = string_field(fields, "role")?
        .parse::<Role>()
        .map_err(ApiError::bad_request)?;

    let planet_id = match fields.get("planetId").and_then(Value::as_str) {
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))?),
        None => None,
    };

    Ok(NewUser {
        first_name: string_field(fields, "firstName")?,
        last_name: string_field(fields, "lastName")?,
        email_address: string_field(fields, "emailAddress")?,
        password_hash,
        role,
        planet_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_new_user_from_validated_fields() {
        let fields = json!({
            "firstName": "Carl",
            "lastName": "Sagan",
            "emailAddress": "carl@cosmos.com",
            "password": "palebluedot",
            "role": "NORMAL",
            "planetId": null
        });
        let user = new_user_from_fields(fields.as_object().unwrap(), "hash".into()).unwrap();
        assert_eq!(user.role, Role::Normal);
        assert_eq!(user.planet_id, None);
        assert_eq!(user.password_hash, "hash");
    }
}
