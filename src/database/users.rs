use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::catalog::classify_constraint;
use crate::database::manager::{quote_identifier, DatabaseError};
use crate::database::models::{NewUser, User};
use crate::database::query_builder::{bind_param_query_as, placeholder};

const USER_CASTS: &[(&str, &str)] = &[
    ("firstName", "text"),
    ("lastName", "text"),
    ("emailAddress", "text"),
    ("password", "text"),
    ("role", "text"),
    ("planetId", "uuid"),
];

pub const DUPLICATE_EMAIL: &str = "User with that email address already exists";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"User\" WHERE \"id\" = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"User\" WHERE \"emailAddress\" = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM \"User\" ORDER BY \"createdAt\" ASC, \"id\" ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM \"User\"")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        Ok((users, total))
    }

    pub async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO "User" ("firstName", "lastName", "emailAddress", "password", "role", "planetId")
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email_address)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(new_user.planet_id)
        .fetch_one(&self.pool)
        .await
        .map_err(email_constraint)
    }

    /// Apply validated column changes. `fields` must only hold `User` columns.
    pub async fn update(&self, id: Uuid, fields: Map<String, Value>) -> Result<Option<User>, DatabaseError> {
        let mut assignments = Vec::with_capacity(fields.len() + 1);
        let mut params = Vec::with_capacity(fields.len() + 1);

        for (i, (column, value)) in fields.into_iter().enumerate() {
            let cast = USER_CASTS
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, cast)| *cast)
                .ok_or_else(|| DatabaseError::QueryError(format!("Unknown user column: {}", column)))?;
            assignments.push(format!("{} = {}", quote_identifier(&column), placeholder(i + 1, Some(cast))));
            params.push(value);
        }
        assignments.push("\"updatedAt\" = now()".to_string());
        params.push(Value::String(id.to_string()));

        let query = format!(
            "UPDATE \"User\" SET {} WHERE \"id\" = ${}::uuid RETURNING *",
            assignments.join(", "),
            params.len()
        );

        let mut q = sqlx::query_as::<_, User>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_optional(&self.pool)
            .await
            .map_err(email_constraint)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM \"User\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// An email clash conflicts with an existing account; it is not bad input
fn email_constraint(err: sqlx::Error) -> DatabaseError {
    match classify_constraint(err, DUPLICATE_EMAIL) {
        DatabaseError::Duplicate(message) => DatabaseError::Conflict(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_are_not_conflicts() {
        let err = email_constraint(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
