//! Documents and queries understood by every document store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Field map of a single document. The document key is not part of it.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by a query or read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Equality filters plus an ordering, applied in that order.
///
/// A document lacking any order-by field is left out of the result, the way
/// managed document stores treat ordered queries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Vec<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Whether a document passes every filter and carries every order field.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
            && self
                .order_by
                .iter()
                .all(|order| document.fields.contains_key(&order.field))
    }

    /// Filters and sorts documents in place of a backend-side query.
    ///
    /// Ties after every order field fall back to the document key so the
    /// result is deterministic.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(doc))
            .collect();

        selected.sort_by(|a, b| {
            for order in &self.order_by {
                let ordering = match (a.get(&order.field), b.get(&order.field)) {
                    (Some(left), Some(right)) => compare_values(left, right),
                    _ => Ordering::Equal,
                };
                let ordering = match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.id.cmp(&b.id)
        });

        selected
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type first, then by value.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}
