//! In-memory document store. Backs the relay server and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{PosError, Result};
use crate::store::{Document, DocumentStore, Fields};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, BTreeMap<String, Fields>>> {
        self.collections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, BTreeMap<String, Fields>>> {
        self.collections.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn missing(collection: &str, id: &str) -> PosError {
    PosError::NotFound(format!("{collection}/{id}"))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        let guard = self.read();
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let guard = self.read();
        Ok(guard.get(collection).and_then(|docs| {
            docs.get(id).map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
        }))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document> {
        let id = Uuid::new_v4().simple().to_string();
        let mut guard = self.write();
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document { id, fields })
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Document> {
        let mut guard = self.write();
        let docs = guard
            .get_mut(collection)
            .ok_or_else(|| missing(collection, id))?;
        let existing = docs.get_mut(id).ok_or_else(|| missing(collection, id))?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(Document {
            id: id.to_string(),
            fields: existing.clone(),
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut guard = self.write();
        let docs = guard
            .get_mut(collection)
            .ok_or_else(|| missing(collection, id))?;
        docs.remove(id).ok_or_else(|| missing(collection, id))?;
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let guard = self.read();
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn order_by(
        &self,
        collection: &str,
        field: &str,
        descending: bool,
    ) -> Result<Vec<Document>> {
        let mut docs = self.get_all(collection).await?;
        docs.sort_by(|a, b| {
            let ka = sort_key(a.field(field));
            let kb = sort_key(b.field(field));
            if descending {
                kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
        Ok(docs)
    }
}

/// Comparable projection of a field value; missing fields sort first.
fn sort_key(value: Option<&Value>) -> (u8, f64, String) {
    match value {
        Some(Value::Number(n)) => (1, n.as_f64().unwrap_or(0.0), String::new()),
        Some(Value::String(s)) => (2, 0.0, s.clone()),
        _ => (0, 0.0, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn add_get_update_delete_roundtrip() {
        let store = MemoryStore::new();
        let doc = store
            .add("products", fields(json!({"name": "Chippy", "price": 10})))
            .await
            .unwrap();

        let fetched = store.get("products", &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.field("name"), Some(&json!("Chippy")));

        let updated = store
            .update("products", &doc.id, fields(json!({"price": 12})))
            .await
            .unwrap();
        assert_eq!(updated.field("price"), Some(&json!(12)));
        assert_eq!(updated.field("name"), Some(&json!("Chippy")));

        store.delete("products", &doc.id).await.unwrap();
        assert!(store.get("products", &doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("products", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::NotFound(_)));
    }

    #[tokio::test]
    async fn query_eq_filters_by_field() {
        let store = MemoryStore::new();
        store
            .add("products", fields(json!({"name": "Coke", "category": "Drinks"})))
            .await
            .unwrap();
        store
            .add("products", fields(json!({"name": "Chippy", "category": "Snacks"})))
            .await
            .unwrap();

        let drinks = store
            .query_eq("products", "category", &json!("Drinks"))
            .await
            .unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].field("name"), Some(&json!("Coke")));
    }

    #[tokio::test]
    async fn order_by_string_field_descending() {
        let store = MemoryStore::new();
        store
            .add("purchases", fields(json!({"date": "2026-01-02T00:00:00Z"})))
            .await
            .unwrap();
        store
            .add("purchases", fields(json!({"date": "2026-01-03T00:00:00Z"})))
            .await
            .unwrap();
        store
            .add("purchases", fields(json!({"date": "2026-01-01T00:00:00Z"})))
            .await
            .unwrap();

        let docs = store.order_by("purchases", "date", true).await.unwrap();
        let dates: Vec<&Value> = docs.iter().filter_map(|d| d.field("date")).collect();
        assert_eq!(
            dates,
            vec![
                &json!("2026-01-03T00:00:00Z"),
                &json!("2026-01-02T00:00:00Z"),
                &json!("2026-01-01T00:00:00Z")
            ]
        );
    }
}
