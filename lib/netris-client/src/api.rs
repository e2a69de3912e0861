//! The operator-facing abstraction over the Netris REST API

use crate::{ClientError, Endpoint, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// CRUD access to Netris collections.
///
/// Payloads are plain JSON so that reconcilers of every kind share one
/// implementation; typed reads go through [`list_typed`].
#[async_trait]
pub trait NetrisApi: Send + Sync {
    /// List every object of a collection
    async fn list(&self, endpoint: Endpoint) -> Result<Vec<Value>>;

    /// Create an object and return its remote id
    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<i64>;

    /// Replace an existing object
    async fn update(&self, endpoint: Endpoint, id: i64, payload: &Value) -> Result<()>;

    /// Delete an object
    async fn delete(&self, endpoint: Endpoint, id: i64) -> Result<()>;
}

/// List a collection and decode every item into `T`.
pub async fn list_typed<T: DeserializeOwned>(
    api: &dyn NetrisApi,
    endpoint: Endpoint,
) -> Result<Vec<T>> {
    api.list(endpoint)
        .await?
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}

/// Extract the id returned by a create call: either a bare number or an
/// object carrying an `id` field.
pub fn extract_id(data: &Value) -> Result<i64> {
    match data {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => map.get("id").and_then(Value::as_i64),
        Value::Array(items) => items.first().and_then(|item| extract_id(item).ok()),
        _ => None,
    }
    .ok_or_else(|| ClientError::UnexpectedPayload(format!("no id in create response: {}", data)))
}
