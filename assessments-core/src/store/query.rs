//! Filter and aggregation pipeline types understood by every store backend
//!
//! The vocabulary is intentionally small: equality, membership and half-open
//! ranges on top-level fields, plus sort and projection stages. Both
//! [`to_json`](Filter::to_json) (Mongo query syntax, also used for logging)
//! and in-process evaluation via [`matches`](Filter::matches) are provided.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{Document, ID_FIELD};

/// A single predicate on a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value
    Eq { field: String, value: Value },
    /// Field equals any of the values
    In { field: String, values: Vec<Value> },
    /// Field is greater than or equal to value
    Gte { field: String, value: Value },
    /// Field is strictly less than value
    Lt { field: String, value: Value },
}

impl Condition {
    fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. }
            | Self::In { field, .. }
            | Self::Gte { field, .. }
            | Self::Lt { field, .. } => field,
        }
    }

    fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(self.field()) else {
            return false;
        };

        match self {
            Self::Eq { value, .. } => values_equal(actual, value),
            Self::In { values, .. } => values.iter().any(|v| values_equal(actual, v)),
            Self::Gte { value, .. } => matches!(
                compare_values(actual, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt { value, .. } => compare_values(actual, value) == Some(Ordering::Less),
        }
    }
}

/// Conjunction of conditions; an empty filter matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter matching a single document by its `_id`
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn one_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Half-open range `[start, end)` on a field
    pub fn within(
        mut self,
        field: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        let field = field.into();
        self.conditions.push(Condition::Gte {
            field: field.clone(),
            value: start.into(),
        });
        self.conditions.push(Condition::Lt {
            field,
            value: end.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    /// Render as a Mongo query document
    pub fn to_json(&self) -> Value {
        let mut query = Map::new();
        for condition in &self.conditions {
            match condition {
                Condition::Eq { field, value } => {
                    query.insert(field.clone(), value.clone());
                }
                Condition::In { field, values } => {
                    merge_operator(&mut query, field, "$in", Value::Array(values.clone()));
                }
                Condition::Gte { field, value } => {
                    merge_operator(&mut query, field, "$gte", value.clone());
                }
                Condition::Lt { field, value } => {
                    merge_operator(&mut query, field, "$lt", value.clone());
                }
            }
        }
        Value::Object(query)
    }
}

fn merge_operator(query: &mut Map<String, Value>, field: &str, op: &str, value: Value) {
    let entry = query
        .entry(field.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(ops) = entry {
        ops.insert(op.to_string(), value);
    }
}

/// Sort order for a pipeline sort stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_mongo(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// One stage of an aggregation pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Sort { field: String, order: SortOrder },
    /// Keep only the listed fields (`_id` is always kept)
    Project(Vec<String>),
}

impl Stage {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Match(filter) => json!({ "$match": filter.to_json() }),
            Self::Sort { field, order } => {
                let mut sort = Map::new();
                sort.insert(field.clone(), Value::from(order.as_mongo()));
                json!({ "$sort": sort })
            }
            Self::Project(fields) => {
                let projection: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.clone(), Value::from(1)))
                    .collect();
                json!({ "$project": projection })
            }
        }
    }
}

/// Ordered list of aggregation stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn to_json(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_json).collect()
    }
}

/// Compare two JSON values the way the store orders them.
///
/// Numbers compare numerically, RFC 3339 strings compare as instants, other
/// strings lexically. Mixed or non-scalar types are unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
