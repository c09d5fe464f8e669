use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::is_valid_identifier;
use super::types::{ColumnCasts, FilterData, FilterOrderInfo, SqlResult};

pub struct Filter {
    table_name: String,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
    casts: ColumnCasts,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
            casts: ColumnCasts::new(),
        })
    }

    pub fn with_casts(mut self, casts: ColumnCasts) -> Self {
        self.casts = casts;
        self
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    /// Paged select that yields each row as one JSON object in a column
    /// named `row`.
    pub fn to_json_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT row_to_json(t) AS row".to_string(),
            format!("FROM \"{}\" t", self.table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = match self.where_data {
            Some(ref where_data) => FilterWhere::generate(where_data, 0, &self.casts)?,
            None => (String::new(), vec![]),
        };
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_exists_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = if where_result.query.is_empty() {
            format!("SELECT EXISTS (SELECT 1 FROM \"{}\") AS found", self.table_name)
        } else {
            format!("SELECT EXISTS (SELECT 1 FROM \"{}\" WHERE {}) AS found", self.table_name, where_result.query)
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() { return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string())); }
        if !is_valid_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_paged_select_with_casts() {
        let mut casts = ColumnCasts::new();
        casts.insert("starId".to_string(), "uuid");
        let mut filter = Filter::new("Asteroid").unwrap().with_casts(casts);
        filter
            .assign(FilterData {
                where_clause: Some(json!({ "starId": "4f9d0c3e-5d1c-4b43-9d55-0c0f3a1f4b2a" })),
                order: Some(json!("mass desc")),
                limit: Some(25),
                offset: Some(50),
            })
            .unwrap();

        let sql = filter.to_json_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM \"Asteroid\" t WHERE \"starId\" = $1::uuid ORDER BY \"mass\" DESC LIMIT 25 OFFSET 50"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn json_select_aliases_the_table() {
        let mut filter = Filter::new("Star").unwrap();
        filter.order(json!("name")).unwrap();
        assert_eq!(
            filter.to_json_sql().unwrap().query,
            "SELECT row_to_json(t) AS row FROM \"Star\" t ORDER BY \"name\" ASC"
        );
    }

    #[test]
    fn count_and_exists_ignore_paging() {
        let mut filter = Filter::new("Comet").unwrap();
        filter.where_clause(json!({ "name": { "$ilike": "%halley%" } })).unwrap();
        filter.limit(10, Some(10)).unwrap();

        assert_eq!(
            filter.to_count_sql().unwrap().query,
            "SELECT COUNT(*) AS count FROM \"Comet\" WHERE \"name\" ILIKE $1"
        );
        assert_eq!(
            filter.to_exists_sql().unwrap().query,
            "SELECT EXISTS (SELECT 1 FROM \"Comet\" WHERE \"name\" ILIKE $1) AS found"
        );
    }

    #[test]
    fn rejects_bad_table_names() {
        assert!(Filter::new("Star; DROP TABLE \"User\"").is_err());
        assert!(Filter::new("").is_err());
        assert!(Filter::new("9lives").is_err());
    }

    #[test]
    fn rejects_negative_paging() {
        let mut filter = Filter::new("Star").unwrap();
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(5, Some(-5)).is_err());
    }
}
