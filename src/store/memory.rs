// In-memory store for tests
//
// Interprets `Query` values against tables held in a mutex, playing the part
// of PostgREST plus the table defaults and triggers the repositories rely on
// (generated ids, created_at/updated_at).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use super::client::{StoreResponse, StoreTransport};
use super::query::{Filter, Operation, Order, Query, Row};
use crate::error::StoreError;

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    queries: Mutex<Vec<Query>>,
    deleted_auth_users: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a row in place as-is, e.g. to seed fixed timestamps
    pub fn seed(&self, table: &str, row: Value) {
        if let Value::Object(row) = row {
            self.tables
                .lock()
                .unwrap()
                .entry(table.to_string())
                .or_default()
                .push(row);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every query executed so far, in order
    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub fn deleted_auth_users(&self) -> Vec<String> {
        self.deleted_auth_users.lock().unwrap().clone()
    }

    fn run(&self, query: &Query) -> Result<StoreResponse, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(query.table.clone()).or_default();
        let now = Value::from(Utc::now().to_rfc3339());

        let (mut rows, count) = match &query.operation {
            Operation::Select { columns } => {
                let mut matched: Vec<Row> = table
                    .iter()
                    .filter(|row| matches_all(row, &query.filters))
                    .cloned()
                    .collect();
                let total = matched.len() as u64;
                sort_rows(&mut matched, &query.orders);
                let mut page = paginate(matched, query.offset, query.limit);
                if query.head {
                    page.clear();
                }
                (project(page, columns), Some(total))
            }
            Operation::Insert { rows } => {
                let inserted: Vec<Row> = rows.iter().map(|row| with_defaults(row.clone(), &now)).collect();
                table.extend(inserted.iter().cloned());
                let total = inserted.len() as u64;
                (inserted, Some(total))
            }
            Operation::Upsert { rows, on_conflict } => {
                let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
                let mut written = Vec::new();
                for row in rows {
                    let existing = table
                        .iter_mut()
                        .find(|candidate| keys.iter().all(|k| candidate.get(*k) == row.get(*k)));
                    match existing {
                        Some(existing) => {
                            for (k, v) in row {
                                existing.insert(k.clone(), v.clone());
                            }
                            existing.insert("updated_at".to_string(), now.clone());
                            written.push(existing.clone());
                        }
                        None => {
                            let inserted = with_defaults(row.clone(), &now);
                            table.push(inserted.clone());
                            written.push(inserted);
                        }
                    }
                }
                let total = written.len() as u64;
                (written, Some(total))
            }
            Operation::Update { values } => {
                let mut updated = Vec::new();
                for row in table.iter_mut().filter(|row| matches_all(row, &query.filters)) {
                    for (k, v) in values {
                        row.insert(k.clone(), v.clone());
                    }
                    if !values.contains_key("updated_at") {
                        row.insert("updated_at".to_string(), now.clone());
                    }
                    updated.push(row.clone());
                }
                let total = updated.len() as u64;
                (updated, Some(total))
            }
            Operation::Delete => {
                let (removed, kept): (Vec<Row>, Vec<Row>) = table
                    .drain(..)
                    .partition(|row| matches_all(row, &query.filters));
                *table = kept;
                let total = removed.len() as u64;
                (removed, Some(total))
            }
        };

        if query.single {
            if rows.len() != 1 {
                return Err(StoreError::not_found(&query.table));
            }
            rows.truncate(1);
        }

        Ok(StoreResponse {
            rows,
            count: if query.count { count } else { None },
        })
    }
}

#[async_trait]
impl StoreTransport for InMemoryStore {
    async fn execute(&self, query: Query) -> Result<StoreResponse, StoreError> {
        self.queries.lock().unwrap().push(query.clone());
        self.run(&query)
    }

    async fn delete_auth_user(&self, user_id: &str) -> Result<(), StoreError> {
        self.deleted_auth_users.lock().unwrap().push(user_id.to_string());
        // Owned rows go with the auth user
        let mut tables = self.tables.lock().unwrap();
        for rows in tables.values_mut() {
            rows.retain(|row| row.get("user_id").and_then(Value::as_str) != Some(user_id));
        }
        Ok(())
    }
}

fn with_defaults(mut row: Row, now: &Value) -> Row {
    row.entry("id")
        .or_insert_with(|| Value::from(uuid::Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert_with(|| now.clone());
    row.entry("updated_at").or_insert_with(|| now.clone());
    row
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let cell = |column: &str| row.get(column).filter(|v| !v.is_null());
    match filter {
        Filter::Eq(c, v) => cell(c).map(render).as_deref() == Some(v.as_str()),
        Filter::Gte(c, v) => cell(c).is_some_and(|cell| compare_text(&render(cell), v) != Ordering::Less),
        Filter::Lte(c, v) => cell(c).is_some_and(|cell| compare_text(&render(cell), v) != Ordering::Greater),
        Filter::In(c, values) => cell(c).is_some_and(|cell| values.contains(&render(cell))),
        Filter::ILike(c, pattern) => cell(c).is_some_and(|cell| ilike(&render(cell), pattern)),
        Filter::Or(filters) => filters.iter().any(|f| matches(row, f)),
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

/// Timestamps and dates compare chronologically, numbers numerically
fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Some(a), Some(b)) = (parse_instant(a), parse_instant(b)) {
        return a.cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

/// Case-insensitive glob match with `*` wildcards
fn ilike(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return value == pattern;
    }

    let mut rest = value.as_str();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

fn sort_rows(rows: &mut [Row], orders: &[Order]) {
    rows.sort_by(|a, b| {
        for order in orders {
            let nulls_first = order.nulls_first.unwrap_or(!order.ascending);
            let left = a.get(&order.column).filter(|v| !v.is_null());
            let right = b.get(&order.column).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => if nulls_first { Ordering::Less } else { Ordering::Greater },
                (Some(_), None) => if nulls_first { Ordering::Greater } else { Ordering::Less },
                (Some(l), Some(r)) => {
                    let ordering = compare_text(&render(l), &render(r));
                    if order.ascending { ordering } else { ordering.reverse() }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn paginate(rows: Vec<Row>, offset: Option<u64>, limit: Option<u64>) -> Vec<Row> {
    let offset = offset.unwrap_or(0) as usize;
    let iter = rows.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit as usize).collect(),
        None => iter.collect(),
    }
}

fn project(rows: Vec<Row>, columns: &str) -> Vec<Row> {
    if columns.trim() == "*" {
        return rows;
    }
    let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .filter(|(k, _)| wanted.contains(&k.as_str()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ilike_patterns() {
        assert!(ilike("Weekly Standup", "*standup*"));
        assert!(ilike("STANDUP notes", "standup*"));
        assert!(!ilike("Planning", "*standup*"));
        assert!(ilike("a-b-c", "a*c"));
        assert!(!ilike("a-b-d", "a*c"));
    }

    #[test]
    fn test_compare_dates_and_timestamps() {
        assert_eq!(compare_text("2024-03-01T10:00:00+00:00", "2024-03-01"), Ordering::Greater);
        assert_eq!(compare_text("2024-02-28", "2024-03-01"), Ordering::Less);
        assert_eq!(compare_text("10", "9"), Ordering::Greater);
    }
}
