//! PostgREST query builder.
//!
//! Renders the subset of PostgREST syntax the client needs: every column,
//! equality filters and one ordering.
//!
//! ```ignore
//! let query = Query::table("convoys")
//!     .eq("is_active", true)
//!     .order("departure_date", Direction::Ascending);
//! assert_eq!(query.path(), "/convoys");
//! ```

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
}

impl Query {
    /// Selects every column of `table`.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Keeps rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    /// Path relative to the PostgREST base URL.
    pub fn path(&self) -> String {
        format!("/{}", self.table)
    }

    /// Query parameters in the order PostgREST receives them.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filters.iter().cloned());
        if let Some((column, direction)) = &self.order {
            params.push((
                "order".to_string(),
                format!("{}.{}", column, direction.as_str()),
            ));
        }
        params
    }

    /// Percent-encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request URL under `rest_url`.
    pub fn url(&self, rest_url: &str) -> String {
        format!("{}{}?{}", rest_url, self.path(), self.query_string())
    }
}
