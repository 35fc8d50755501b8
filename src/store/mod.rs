//! Storage: the document-store abstraction and the file-backed local cache.

pub mod cache;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Collection names used by the store.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const PURCHASES: &str = "purchases";
    pub const SESSIONS: &str = "sessions";
}

pub type Fields = serde_json::Map<String, Value>;

/// A stored document: the store-assigned id plus its fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// The document as JSON with the id merged in, the shape both the relay
    /// and the façade hand to callers.
    pub fn into_json(self) -> Value {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Value::Object(fields)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Eventually-consistent document collection with at-least-once writes.
/// Get/add/update/delete plus field-equality queries and single-field
/// ordering.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>>;
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document>;
    /// Merge `fields` into an existing document. `NotFound` when the id does
    /// not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Document>;
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
    async fn query_eq(&self, collection: &str, field: &str, value: &Value)
        -> Result<Vec<Document>>;
    async fn order_by(&self, collection: &str, field: &str, descending: bool)
        -> Result<Vec<Document>>;
}
