use serde_json::Value;

use super::error::FilterError;
use super::is_valid_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"column [asc|desc], ..."`
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let Value::String(s) = order else {
            return Err(FilterError::InvalidOrder("ORDER must be a string".to_string()));
        };

        let mut infos = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            let Some(column) = it.next() else { continue };
            if !is_valid_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
            let sort = match it.next() {
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            infos.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(infos)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
