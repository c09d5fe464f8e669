use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;
use crate::filter::{ColumnCasts, Filter, FilterData};

/// Runs filter-generated SQL against one table and returns rows as JSON
pub struct QueryBuilder {
    filter: Filter,
}

impl QueryBuilder {
    pub fn new(table_name: &str, casts: ColumnCasts) -> Result<Self, DatabaseError> {
        let filter = Filter::new(table_name)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?
            .with_casts(casts);
        Ok(Self { filter })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(self)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = self.json_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<Value>, DatabaseError> {
        let sql_result = self.json_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        match q.fetch_optional(pool).await? {
            Some(row) => Ok(Some(row.try_get("row")?)),
            None => Ok(None),
        }
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self
            .filter
            .to_count_sql()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn exists(self, pool: &PgPool) -> Result<bool, DatabaseError> {
        let sql_result = self
            .filter
            .to_exists_sql()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let found: bool = row.try_get("found")?;
        Ok(found)
    }

    fn json_sql(&self) -> Result<SqlResult, DatabaseError> {
        self.filter
            .to_json_sql()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))
    }
}

/// Placeholder for `index`, cast to the column type when one is known
pub(crate) fn placeholder(index: usize, cast: Option<&str>) -> String {
    match cast {
        Some(cast) => format!("${}::{}", index, cast),
        None => format!("${}", index),
    }
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_carry_casts() {
        assert_eq!(placeholder(3, Some("uuid")), "$3::uuid");
        assert_eq!(placeholder(1, None), "$1");
    }

    #[test]
    fn rejects_unsafe_table_names() {
        assert!(QueryBuilder::new("Star\"--", ColumnCasts::new()).is_err());
    }
}
