//! Parameterized SQL construction for the offline catalog.
//!
//! User-supplied values are bound through DuckDB `?` placeholders, never
//! spliced into the SQL text. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use mtgsearch_sdk::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("cards")
//!     .select(&["payload"])
//!     .where_eq("rarity", "rare")
//!     .order_by(&["name ASC"])
//!     .limit(10)
//!     .build();
//! assert_eq!(params, vec!["rare"]);
//! assert!(sql.ends_with("LIMIT 10"));
//! ```

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    order_params: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder selecting `*` from `table`.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            order_params: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition using `?` for each value in `params`, in order.
    /// Conditions are joined with AND.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add ORDER BY clauses (e.g. `"name ASC"`), after any added earlier.
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Add an ORDER BY clause using `?` for each value in `params`.
    /// Its values are bound after every WHERE value.
    pub fn order_by_param(&mut self, clause: &str, params: &[&str]) -> &mut Self {
        self.order_by_cols.push(clause.to_string());
        self.order_params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Build the SQL string and its parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        let mut params = self.params.clone();
        params.extend(self.order_params.iter().cloned());
        (parts.join("\n"), params)
    }
}
