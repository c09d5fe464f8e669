use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::ResourceDef;
use crate::config::PaginationConfig;
use crate::filter::{FilterData, SortDirection};
use crate::validation::{FieldKind, FieldRule, ValidationErrors};

/// `field[op]=value` suffixes accepted on non-text fields. `in` takes a
/// comma-separated list and `between` exactly two values.
const OPERATORS: &[(&str, &str)] = &[
    ("ne", "$ne"),
    ("in", "$in"),
    ("gt", "$gt"),
    ("gte", "$gte"),
    ("lt", "$lt"),
    ("lte", "$lte"),
    ("between", "$between"),
];

/// Parsed `GET /{resource}` query string
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filters: Map<String, Value>,
    pub sort_by: String,
    pub sort_order: SortDirection,
    pub page: u32,
    pub amount: u32,
}

/// Pagination block returned alongside list data
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Page {
    pub page: u32,
    pub amount: u32,
    pub total: i64,
    pub pages: i64,
}

impl Page {
    pub fn new(page: u32, amount: u32, total: i64) -> Self {
        let per_page = i64::from(amount.max(1));
        Self {
            page,
            amount,
            total,
            pages: (total + per_page - 1) / per_page,
        }
    }
}

impl ListQuery {
    pub fn parse(
        def: &ResourceDef,
        params: &HashMap<String, String>,
        pagination: &PaginationConfig,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let sort_by = params.get("sortBy").cloned().unwrap_or_else(|| "id".to_string());
        if !def.is_sortable(&sort_by) {
            errors.push("sortBy", format!("Cannot sort {} by {}", def.plural, sort_by));
        }

        let sort_order = match params.get("sortOrder").map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => {
                errors.push("sortOrder", "Sort order must be one of the following: asc,desc");
                SortDirection::Asc
            }
        };

        let page = match params.get("page") {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    errors.push("page", "Page should be an integer greater than or equal to 1");
                    1
                }
            },
        };

        let amount = match params.get("amount") {
            None => pagination.default_amount,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if (1..=pagination.max_amount).contains(&n) => n,
                _ => {
                    errors.push(
                        "amount",
                        format!("Amount should be an integer between 1 and {}", pagination.max_amount),
                    );
                    pagination.default_amount
                }
            },
        };

        let mut filters = Map::new();
        for rule in def.fields() {
            if let Some(conditions) = field_conditions(rule, params, &mut errors) {
                filters.insert(rule.name.to_string(), Value::Object(conditions));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self { filters, sort_by, sort_order, page, amount })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.amount)
    }

    /// Filter for the requested page
    pub fn to_filter_data(&self) -> FilterData {
        FilterData {
            where_clause: self.where_clause(),
            order: Some(Value::String(format!("{} {}", self.sort_by, self.sort_order.to_sql()))),
            limit: Some(i64::from(self.amount)),
            offset: Some(self.offset()),
        }
    }

    /// Filter for counting every matching row, ignoring paging
    pub fn to_count_filter(&self) -> FilterData {
        FilterData {
            where_clause: self.where_clause(),
            ..Default::default()
        }
    }

    fn where_clause(&self) -> Option<Value> {
        if self.filters.is_empty() {
            None
        } else {
            Some(Value::Object(self.filters.clone()))
        }
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Conditions for one field from `name=` and `name[op]=` parameters
fn field_conditions(
    rule: &FieldRule,
    params: &HashMap<String, String>,
    errors: &mut ValidationErrors,
) -> Option<Map<String, Value>> {
    let mut conditions = Map::new();

    if let Some(raw) = params.get(rule.name) {
        if rule.kind.is_textual() {
            conditions.insert("$ilike".into(), json!(format!("%{}%", escape_like(raw))));
        } else {
            match rule.check(&Value::String(raw.clone())) {
                Ok(value) => {
                    conditions.insert("$eq".into(), value);
                }
                Err(message) => errors.push(rule.name, message),
            }
        }
    }

    if rule.kind.is_textual() {
        return (!conditions.is_empty()).then_some(conditions);
    }
    let ordered = matches!(rule.kind, FieldKind::Number { .. } | FieldKind::Integer { .. });

    for (suffix, op) in OPERATORS {
        let key = format!("{}[{}]", rule.name, suffix);
        let Some(raw) = params.get(&key) else { continue };

        if !ordered && !matches!(*suffix, "ne" | "in") {
            errors.push(key, format!("{} cannot be compared with {}", rule.label, suffix));
            continue;
        }

        let parsed = match *suffix {
            "in" | "between" => {
                let values: Result<Vec<Value>, String> = raw
                    .split(',')
                    .map(|part| rule.check(&Value::String(part.trim().to_string())))
                    .collect();
                match values {
                    Ok(values) if *suffix == "between" && values.len() != 2 => {
                        Err(format!("{} between needs exactly two comma-separated values", rule.label))
                    }
                    other => other.map(Value::Array),
                }
            }
            _ => rule.check(&Value::String(raw.clone())),
        };

        match parsed {
            Ok(value) => {
                conditions.insert((*op).to_string(), value);
            }
            Err(message) => errors.push(key, message),
        }
    }

    (!conditions.is_empty()).then_some(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ASTEROID, SATELLITE};
    use crate::config::AppConfig;
    use crate::filter::filter_where::FilterWhere;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn pagination() -> PaginationConfig {
        AppConfig::development().pagination
    }

    #[test]
    fn defaults() {
        let q = ListQuery::parse(&ASTEROID, &HashMap::new(), &pagination()).unwrap();
        assert_eq!(q.sort_by, "id");
        assert_eq!(q.sort_order, SortDirection::Asc);
        assert_eq!((q.page, q.amount), (1, 25));
        assert!(q.filters.is_empty());
    }

    #[test]
    fn text_filters_use_ilike_and_others_are_coerced() {
        let q = ListQuery::parse(
            &ASTEROID,
            &params(&[("name", "ce_"), ("year", "12"), ("type", "C_TYPE"), ("colour", "red")]),
            &pagination(),
        )
        .unwrap();
        assert_eq!(q.filters["name"], json!({ "$ilike": "%ce\\_%" }));
        assert_eq!(q.filters["year"], json!({ "$eq": 12.0 }));
        assert_eq!(q.filters["type"], json!({ "$eq": "C_TYPE" }));
        assert!(!q.filters.contains_key("colour"));
    }

    #[test]
    fn bracketed_operators_build_range_and_set_conditions() {
        let q = ListQuery::parse(
            &ASTEROID,
            &params(&[
                ("mass[gte]", "1e17"),
                ("mass[lt]", "3e19"),
                ("year[between]", "10, 20"),
                ("type[in]", "C_TYPE,M_TYPE"),
                ("location[ne]", "TROJAN"),
            ]),
            &pagination(),
        )
        .unwrap();
        assert_eq!(q.filters["mass"], json!({ "$gte": 1e17, "$lt": 3e19 }));
        assert_eq!(q.filters["year"], json!({ "$between": [10.0, 20.0] }));
        assert_eq!(q.filters["type"], json!({ "$in": ["C_TYPE", "M_TYPE"] }));
        assert_eq!(q.filters["location"], json!({ "$ne": "TROJAN" }));
    }

    #[test]
    fn bracketed_operators_are_validated() {
        let err = ListQuery::parse(
            &ASTEROID,
            &params(&[
                ("mass[gt]", "heavy"),
                ("year[between]", "10"),
                ("type[gt]", "C_TYPE"),
                ("type[in]", "C_TYPE,X_TYPE"),
            ]),
            &pagination(),
        )
        .unwrap_err()
        .into_field_map();
        assert_eq!(err["mass[gt]"], "Mass should be a number");
        assert_eq!(err["year[between]"], "Year between needs exactly two comma-separated values");
        assert_eq!(err["type[gt]"], "Type cannot be compared with gt");
        assert_eq!(err["type[in]"], "Type must be one of the following: C_TYPE,S_TYPE,M_TYPE");
    }

    #[test]
    fn filters_render_to_sql() {
        let q = ListQuery::parse(&ASTEROID, &params(&[("mass[gte]", "1e17"), ("name", "ves")]), &pagination()).unwrap();
        let (sql, params) = FilterWhere::generate(&Value::Object(q.filters), 0, &ASTEROID.casts()).unwrap();
        assert_eq!(sql, "\"mass\" >= $1::double precision AND \"name\" ILIKE $2");
        assert_eq!(params, vec![json!(1e17), json!("%ves%")]);
    }

    #[test]
    fn invalid_paging_and_sorting_are_rejected() {
        let err = ListQuery::parse(
            &SATELLITE,
            &params(&[("sortBy", "password"), ("sortOrder", "up"), ("page", "0"), ("amount", "1000")]),
            &pagination(),
        )
        .unwrap_err()
        .into_field_map();
        assert!(err.contains_key("sortBy"));
        assert!(err.contains_key("sortOrder"));
        assert!(err.contains_key("page"));
        assert_eq!(err["amount"], "Amount should be an integer between 1 and 100");
    }

    #[test]
    fn filter_data_pages_results() {
        let q = ListQuery::parse(
            &ASTEROID,
            &params(&[("sortBy", "mass"), ("sortOrder", "DESC"), ("page", "3"), ("amount", "10")]),
            &pagination(),
        )
        .unwrap();
        let data = q.to_filter_data();
        assert_eq!(data.order, Some(json!("mass DESC")));
        assert_eq!(data.limit, Some(10));
        assert_eq!(data.offset, Some(20));
        assert!(q.to_count_filter().limit.is_none());
    }

    #[test]
    fn page_counts_round_up() {
        assert_eq!(Page::new(1, 25, 51).pages, 3);
        assert_eq!(Page::new(1, 25, 0).pages, 0);
    }
}
