use super::{DocumentStore, StoreError};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryCollection {
    docs: Vec<Document>,
    unique_fields: Vec<String>,
}

impl MemoryCollection {
    /// Checks `candidate` against every unique field of the documents other
    /// than the one at `skip`.
    fn check_unique(&self, candidate: &Document, skip: Option<usize>) -> Result<(), StoreError> {
        for field in &self.unique_fields {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && doc.get(field) == Some(value));
            if clash {
                return Err(StoreError::DuplicateKey(format!(
                    "{} already exists: {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Process-local document store.
///
/// Each operation holds the lock for its whole duration, so an update is
/// atomic with respect to every other operation on the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key) == Some(expected))
}

fn apply_update(target: &mut Document, update: &Document) -> Result<(), StoreError> {
    for (operator, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(StoreError::InvalidUpdate(format!(
                "{} expects a document of fields",
                operator
            )));
        };
        match operator.as_str() {
            "$set" => {
                for (field, value) in fields {
                    target.insert(field.clone(), value.clone());
                }
            }
            "$push" => {
                for (field, value) in fields {
                    match target.get_mut(field) {
                        Some(Bson::Array(values)) => values.push(value.clone()),
                        Some(_) => {
                            return Err(StoreError::InvalidUpdate(format!(
                                "cannot $push to non-array field {}",
                                field
                            )))
                        }
                        None => {
                            target.insert(field.clone(), Bson::Array(vec![value.clone()]));
                        }
                    }
                }
            }
            other => {
                return Err(StoreError::InvalidUpdate(format!(
                    "unsupported update operator {}",
                    other
                )))
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        target.check_unique(&doc, None)?;

        let id = match doc.get("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        target.docs.push(doc);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = target.docs.iter().position(|doc| matches(doc, &filter)) else {
            return Ok(None);
        };

        let mut updated = target.docs[index].clone();
        apply_update(&mut updated, &update)?;
        target.check_unique(&updated, Some(index))?;
        target.docs[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn remove(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = target.docs.len();
        target.docs.retain(|doc| !matches(doc, &filter));
        Ok((before - target.docs.len()) as u64)
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        if target.unique_fields.iter().any(|f| f == field) {
            return Ok(());
        }

        let mut seen = Vec::new();
        for value in target.docs.iter().filter_map(|doc| doc.get(field)) {
            if seen.contains(&value) {
                return Err(StoreError::DuplicateKey(format!(
                    "cannot create unique index on {}: duplicate value {}",
                    field, value
                )));
            }
            seen.push(value);
        }

        target.unique_fields.push(field.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
