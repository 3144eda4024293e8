//! Query description and pagination cursor

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of items requested per page
pub const DEFAULT_PAGE_LIMIT: u32 = 2000;

/// An opaque condition expression built by a predicate builder.
///
/// The engine never looks inside; only the fetcher forwards the parts to the
/// store verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Expression text, e.g. `#pk = :pk`
    pub expression: String,
    /// Placeholder names (`#pk` -> `pk`)
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    /// Placeholder values in the store's type-tagged form
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl Expression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, placeholder: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(placeholder.into(), name.into());
        self
    }

    pub fn with_value(mut self, placeholder: impl Into<String>, value: Value) -> Self {
        self.values.insert(placeholder.into(), value);
        self
    }
}

/// What to extract. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Table identifier
    pub table_name: String,
    /// Optional secondary index
    pub index: Option<String>,
    /// Items requested per page
    pub page_limit: NonZeroU32,
    /// Key condition; its presence turns a scan into a query
    pub key_condition: Option<Expression>,
    /// Filter applied by the store after reading
    pub filter: Option<Expression>,
}

impl QuerySpec {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index: None,
            page_limit: NonZeroU32::new(DEFAULT_PAGE_LIMIT).unwrap_or(NonZeroU32::MIN),
            key_condition: None,
            filter: None,
        }
    }

    /// True for a key-condition query rather than a scan
    pub fn is_query(&self) -> bool {
        self.key_condition.is_some()
    }
}

/// Cursor returned by the store. Presence means more pages exist.
///
/// Passed back to the next fetch exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(Value);

impl ContinuationToken {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for ContinuationToken {
    fn from(s: &str) -> Self {
        ContinuationToken(Value::String(s.to_string()))
    }
}
