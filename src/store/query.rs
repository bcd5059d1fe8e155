// Store queries - typed PostgREST requests
//
// A `Query` is plain data describing one request against `/rest/v1/{table}`.
// It renders itself into the method, query string, Prefer header and body the
// REST API expects, so transports only have to ship it.

use reqwest::Method;
use serde_json::{Map, Value};

/// A snake_case keyed record as stored in a table
pub type Row = Map<String, Value>;

/// Characters PostgREST treats as syntax inside `in.(...)` and `or=(...)`
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\'];

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    Gte(String, String),
    Lte(String, String),
    In(String, Vec<String>),
    /// Case-insensitive pattern match, `*` is the wildcard
    ILike(String, String),
    /// Any of the inner filters
    Or(Vec<Filter>),
}

impl Filter {
    /// `*term*` substring match on `column`
    pub fn ilike_contains(column: &str, term: &str) -> Self {
        Filter::ILike(column.to_string(), format!("*{}*", term))
    }

    /// Render as a top-level query parameter
    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(c, v) => (c.clone(), format!("eq.{}", v)),
            Filter::Gte(c, v) => (c.clone(), format!("gte.{}", v)),
            Filter::Lte(c, v) => (c.clone(), format!("lte.{}", v)),
            Filter::In(c, values) => (c.clone(), format!("in.({})", join_quoted(values))),
            Filter::ILike(c, p) => (c.clone(), format!("ilike.{}", p)),
            Filter::Or(filters) => (
                "or".to_string(),
                format!(
                    "({})",
                    filters.iter().map(Filter::to_logic).collect::<Vec<_>>().join(",")
                ),
            ),
        }
    }

    /// Render inside a logic tree: `column.op.value`
    fn to_logic(&self) -> String {
        match self {
            Filter::Eq(c, v) => format!("{}.eq.{}", c, quote(v)),
            Filter::Gte(c, v) => format!("{}.gte.{}", c, quote(v)),
            Filter::Lte(c, v) => format!("{}.lte.{}", c, quote(v)),
            Filter::In(c, values) => format!("{}.in.({})", c, join_quoted(values)),
            Filter::ILike(c, p) => format!("{}.ilike.{}", c, quote(p)),
            Filter::Or(filters) => format!(
                "or({})",
                filters.iter().map(Filter::to_logic).collect::<Vec<_>>().join(",")
            ),
        }
    }
}

fn quote(value: &str) -> String {
    if value.contains(RESERVED) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

fn join_quoted(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
    /// `None` keeps the store default (nulls last ascending, first descending)
    pub nulls_first: Option<bool>,
}

impl Order {
    fn render(&self) -> String {
        let mut out = format!("{}.{}", self.column, if self.ascending { "asc" } else { "desc" });
        match self.nulls_first {
            Some(true) => out.push_str(".nullsfirst"),
            Some(false) => out.push_str(".nullslast"),
            None => {}
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select { columns: String },
    Insert { rows: Vec<Row> },
    Upsert { rows: Vec<Row>, on_conflict: String },
    Update { values: Row },
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub operation: Operation,
    pub filters: Vec<Filter>,
    pub orders: Vec<Order>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Ask for the exact total row count
    pub count: bool,
    /// Exactly one row expected; zero rows is a not-found error
    pub single: bool,
    /// Count only, no rows
    pub head: bool,
}

impl Query {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            operation: Operation::Select {
                columns: "*".to_string(),
            },
            filters: Vec::new(),
            orders: Vec::new(),
            offset: None,
            limit: None,
            count: false,
            single: false,
            head: false,
        }
    }

    pub fn method(&self) -> Method {
        match &self.operation {
            Operation::Select { .. } if self.head => Method::HEAD,
            Operation::Select { .. } => Method::GET,
            Operation::Insert { .. } | Operation::Upsert { .. } => Method::POST,
            Operation::Update { .. } => Method::PATCH,
            Operation::Delete => Method::DELETE,
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        match &self.operation {
            Operation::Select { columns } => params.push(("select".to_string(), columns.clone())),
            Operation::Upsert { on_conflict, .. } => {
                params.push(("on_conflict".to_string(), on_conflict.clone()));
                params.push(("select".to_string(), "*".to_string()));
            }
            _ => params.push(("select".to_string(), "*".to_string())),
        }

        params.extend(self.filters.iter().map(Filter::to_param));

        if !self.orders.is_empty() {
            let order = self.orders.iter().map(Order::render).collect::<Vec<_>>().join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    pub fn prefer(&self) -> Option<String> {
        let mut parts = Vec::new();
        match &self.operation {
            Operation::Select { .. } => {}
            Operation::Upsert { .. } => {
                parts.push("return=representation");
                parts.push("resolution=merge-duplicates");
            }
            _ => parts.push("return=representation"),
        }
        if self.count {
            parts.push("count=exact");
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }

    pub fn body(&self) -> Option<Value> {
        match &self.operation {
            Operation::Insert { rows } | Operation::Upsert { rows, .. } => Some(Value::Array(
                rows.iter().cloned().map(Value::Object).collect(),
            )),
            Operation::Update { values } => Some(Value::Object(values.clone())),
            Operation::Select { .. } | Operation::Delete => None,
        }
    }
}
