use serde_json::{json, Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::catalog::{ListQuery, ResourceDef};
use crate::database::manager::{quote_identifier, DatabaseError};
use crate::database::query_builder::{bind_param_query, placeholder, QueryBuilder};
use crate::filter::FilterData;
use crate::validation::Mode;

/// CRUD over one catalog table. Rows travel as JSON objects keyed by column.
#[derive(Clone)]
pub struct CatalogRepository {
    def: &'static ResourceDef,
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(def: &'static ResourceDef, pool: PgPool) -> Self {
        Self { def, pool }
    }

    fn builder(&self) -> Result<QueryBuilder, DatabaseError> {
        QueryBuilder::new(self.def.table, self.def.casts())
    }

    fn by_id(id: Uuid) -> FilterData {
        FilterData {
            where_clause: Some(json!({ "id": id.to_string() })),
            ..Default::default()
        }
    }

    /// One page of rows plus the total number of matching rows
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<Value>, i64), DatabaseError> {
        let rows = self
            .builder()?
            .filter(query.to_filter_data())?
            .select_all(&self.pool)
            .await?;
        let total = self
            .builder()?
            .filter(query.to_count_filter())?
            .count(&self.pool)
            .await?;
        Ok((rows, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        self.builder()?
            .filter(Self::by_id(id))?
            .select_optional(&self.pool)
            .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.builder()?
            .filter(Self::by_id(id))?
            .exists(&self.pool)
            .await
    }

    pub async fn any(&self) -> Result<bool, DatabaseError> {
        self.builder()?.exists(&self.pool).await
    }

    pub async fn insert(&self, fields: Map<String, Value>) -> Result<Value, DatabaseError> {
        let casts = self.def.casts();
        let mut columns = Vec::with_capacity(fields.len());
        let mut placeholders = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());

        for (i, (column, value)) in fields.into_iter().enumerate() {
            placeholders.push(placeholder(i + 1, casts.get(&column).copied()));
            columns.push(quote_identifier(&column));
            params.push(value);
        }

        let query = format!(
            "WITH t AS (INSERT INTO {} ({}) VALUES ({}) RETURNING *) SELECT row_to_json(t) AS row FROM t",
            quote_identifier(self.def.table),
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await.map_err(|e| self.classify(e))?;
        Ok(row.try_get("row")?)
    }

    /// Replace (`Mode::Full`) or patch (`Mode::Partial`) a row. A full update
    /// writes NULL into every optional column the body left out.
    pub async fn update(&self, id: Uuid, mut fields: Map<String, Value>, mode: Mode) -> Result<Option<Value>, DatabaseError> {
        if mode == Mode::Full {
            for rule in self.def.fields() {
                fields.entry(rule.name.to_string()).or_insert(Value::Null);
            }
        }

        let casts = self.def.casts();
        let mut assignments = Vec::with_capacity(fields.len() + 1);
        let mut params = Vec::with_capacity(fields.len() + 1);

        for (i, (column, value)) in fields.into_iter().enumerate() {
            assignments.push(format!(
                "{} = {}",
                quote_identifier(&column),
                placeholder(i + 1, casts.get(&column).copied())
            ));
            params.push(value);
        }
        assignments.push("\"updatedAt\" = now()".to_string());
        params.push(Value::String(id.to_string()));

        let query = format!(
            "WITH t AS (UPDATE {} SET {} WHERE \"id\" = ${}::uuid RETURNING *) SELECT row_to_json(t) AS row FROM t",
            quote_identifier(self.def.table),
            assignments.join(", "),
            params.len()
        );

        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        match q.fetch_optional(&self.pool).await.map_err(|e| self.classify(e))? {
            Some(row) => Ok(Some(row.try_get("row")?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let query = format!("DELETE FROM {} WHERE \"id\" = $1", quote_identifier(self.def.table));
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    fn classify(&self, err: sqlx::Error) -> DatabaseError {
        classify_constraint(err, &format!("A {} with the same name already exists", self.def.singular))
    }
}

/// Turn constraint violations into client-facing errors
pub(crate) fn classify_constraint(err: sqlx::Error, duplicate_message: &str) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DatabaseError::Duplicate(duplicate_message.to_string());
        }
        if db.is_foreign_key_violation() {
            return DatabaseError::MissingReference("Referenced record does not exist".to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_pass_through() {
        let err = classify_constraint(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
