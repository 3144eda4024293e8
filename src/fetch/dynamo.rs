//! Scan/Query over the store's JSON protocol
//!
//! Requests are POSTed with an `X-Amz-Target` header naming the operation and
//! a JSON body; responses carry `Items` and, when more pages exist,
//! `LastEvaluatedKey`. Signing and HTTP are the [`Transport`]'s business.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::model::{ContinuationToken, Expression, QuerySpec, RawItem};

use super::{Page, PageFetcher};

const TARGET_PREFIX: &str = "DynamoDB_20120810";

/// Store operation backing a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Scan,
    Query,
}

impl Operation {
    /// Value of the `X-Amz-Target` header
    pub fn target(self) -> String {
        format!("{}.{}", TARGET_PREFIX, self)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Scan => write!(f, "Scan"),
            Operation::Query => write!(f, "Query"),
        }
    }
}

/// Sends one request body and returns the raw response body.
///
/// Authentication, endpoints, timeouts, and any retry policy live here, not in
/// the engine.
pub trait Transport: Send {
    fn send(&mut self, operation: Operation, body: &Value) -> Result<String, FetchError>;
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(rename = "Items", default)]
    items: Vec<RawItem>,
    #[serde(rename = "LastEvaluatedKey", default)]
    last_evaluated_key: Option<Value>,
}

/// [`PageFetcher`] issuing Scan, or Query when a key condition is set
pub struct DynamoFetcher<T> {
    transport: T,
}

impl<T: Transport> DynamoFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: Transport> PageFetcher for DynamoFetcher<T> {
    fn fetch_page(
        &mut self,
        spec: &QuerySpec,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, FetchError> {
        let operation = if spec.is_query() {
            Operation::Query
        } else {
            Operation::Scan
        };
        let body = build_request(spec, token);
        let response = self.transport.send(operation, &body)?;
        parse_response(&response)
    }
}

/// Build the request body for one page
pub(crate) fn build_request(spec: &QuerySpec, token: Option<&ContinuationToken>) -> Value {
    let mut body = Map::new();
    body.insert("TableName".into(), Value::String(spec.table_name.clone()));
    if let Some(index) = &spec.index {
        body.insert("IndexName".into(), Value::String(index.clone()));
    }
    body.insert("Limit".into(), Value::from(spec.page_limit.get()));
    if let Some(token) = token {
        body.insert("ExclusiveStartKey".into(), token.as_value().clone());
    }

    let mut names = Map::new();
    let mut values = Map::new();
    if let Some(cond) = &spec.key_condition {
        body.insert(
            "KeyConditionExpression".into(),
            Value::String(cond.expression.clone()),
        );
        merge_placeholders(cond, &mut names, &mut values);
    }
    if let Some(filter) = &spec.filter {
        body.insert(
            "FilterExpression".into(),
            Value::String(filter.expression.clone()),
        );
        merge_placeholders(filter, &mut names, &mut values);
    }
    if !names.is_empty() {
        body.insert("ExpressionAttributeNames".into(), Value::Object(names));
    }
    if !values.is_empty() {
        body.insert("ExpressionAttributeValues".into(), Value::Object(values));
    }

    Value::Object(body)
}

fn merge_placeholders(expr: &Expression, names: &mut Map<String, Value>, values: &mut Map<String, Value>) {
    for (placeholder, name) in &expr.names {
        names.insert(placeholder.clone(), Value::String(name.clone()));
    }
    for (placeholder, value) in &expr.values {
        values.insert(placeholder.clone(), value.clone());
    }
}

/// Parse a response body into a [`Page`]
pub(crate) fn parse_response(body: &str) -> Result<Page, FetchError> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    let next_token = match wire.last_evaluated_key {
        None | Some(Value::Null) => None,
        Some(key) => Some(ContinuationToken::new(key)),
    };
    Ok(Page::new(wire.items, next_token))
}
