use serde_json::Value;

use super::error::FilterError;
use super::is_valid_identifier;
use super::types::{ColumnCasts, FilterOp, FilterWhereInfo};

/// Renders `{column: value}` and `{column: {"$op": value}}` objects to an
/// AND-joined predicate with numbered placeholders.
pub struct FilterWhere<'a> {
    param_values: Vec<Value>,
    param_index: usize,
    casts: &'a ColumnCasts,
}

impl<'a> FilterWhere<'a> {
    pub fn new(starting_param_index: usize, casts: &'a ColumnCasts) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            casts,
        }
    }

    /// Render `where_data` to an SQL predicate. Placeholders are numbered from
    /// `starting_param_index + 1`; an empty predicate means "no condition".
    pub fn generate(where_data: &Value, starting_param_index: usize, casts: &ColumnCasts) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = FilterWhere::new(starting_param_index, casts);
        let conditions = Self::parse_where_data(where_data)?;

        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_where_data(where_data: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(vec![]),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut conditions = Vec::new();
        for (field, value) in obj {
            if !is_valid_identifier(field) {
                return Err(FilterError::InvalidColumn(field.clone()));
            }
            match value {
                Value::Object(ops) => {
                    for (op_key, op_val) in ops {
                        let operator = FilterOp::from_key(op_key)
                            .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                        conditions.push(FilterWhereInfo { column: field.clone(), operator, data: op_val.clone() });
                    }
                }
                // Implicit equality: { field: value }
                _ => conditions.push(FilterWhereInfo { column: field.clone(), operator: FilterOp::Eq, data: value.clone() }),
            }
        }
        Ok(conditions)
    }

    fn build_sql_condition(&mut self, condition: FilterWhereInfo) -> Result<String, FilterError> {
        let column = condition.column.as_str();
        let quoted_column = format!("\"{}\"", column);
        let data = condition.data;
        match condition.operator {
            FilterOp::Eq => {
                if data.is_null() { Ok(format!("{} IS NULL", quoted_column)) }
                else { Ok(format!("{} = {}", quoted_column, self.param(column, data))) }
            }
            FilterOp::Ne => {
                if data.is_null() { Ok(format!("{} IS NOT NULL", quoted_column)) }
                else { Ok(format!("{} <> {}", quoted_column, self.param(column, data))) }
            }
            FilterOp::Gt => Ok(format!("{} > {}", quoted_column, self.param(column, data))),
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.param(column, data))),
            FilterOp::Lt => Ok(format!("{} < {}", quoted_column, self.param(column, data))),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.param(column, data))),
            // ILIKE always compares text, so the column cast is not applied
            FilterOp::ILike => Ok(format!("{} ILIKE {}", quoted_column, self.param_uncast(data))),
            FilterOp::In => match data {
                Value::Array(values) if values.is_empty() => Ok("1=0".to_string()),
                Value::Array(values) => {
                    let params: Vec<String> = values.into_iter().map(|v| self.param(column, v)).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                }
                other => Ok(format!("{} = {}", quoted_column, self.param(column, other))),
            },
            FilterOp::Between => match data {
                Value::Array(values) if values.len() == 2 => {
                    let mut values = values.into_iter();
                    let low = self.param(column, values.next().unwrap_or(Value::Null));
                    let high = self.param(column, values.next().unwrap_or(Value::Null));
                    Ok(format!("{} BETWEEN {} AND {}", quoted_column, low, high))
                }
                _ => Err(FilterError::InvalidOperatorData("$between requires array with 2 values".to_string())),
            },
        }
    }

    fn param(&mut self, column: &str, value: Value) -> String {
        let placeholder = self.param_uncast(value);
        match self.casts.get(column) {
            Some(cast) => format!("{}::{}", placeholder, cast),
            None => placeholder,
        }
    }

    fn param_uncast(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
