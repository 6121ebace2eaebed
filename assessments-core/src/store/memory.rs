//! In-process document store
//!
//! Backs development servers and tests. Each operation takes the collection
//! lock once, so single-document operations are atomic with respect to each
//! other; nothing is persisted across restarts.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::{Condition, SortOrder, Stage, compare_values};
use super::traits::{BulkWriteResult, DeleteResult, DocumentStore, UpdateResult, WriteOperation};
use super::{Document, Filter, ID_FIELD, Pipeline, StoreError};

/// Document store backed by a `HashMap` of collections
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn document_id(doc: &Document) -> Option<String> {
    match doc.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn ensure_id(doc: &mut Document) -> String {
    match document_id(doc) {
        Some(id) => id,
        None => {
            let id = Uuid::now_v7().to_string();
            doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    }
}

fn insert_into(
    docs: &mut Vec<Document>,
    collection: &str,
    mut document: Document,
) -> Result<String, StoreError> {
    let id = ensure_id(&mut document);
    if docs.iter().any(|d| document_id(d).as_deref() == Some(id.as_str())) {
        return Err(StoreError::DuplicateKey {
            collection: collection.to_string(),
            id,
        });
    }
    docs.push(document);
    Ok(id)
}

/// Seed document for an upsert: the filter's equality fields plus the update
fn upsert_seed(filter: &Filter, set: &Document) -> Document {
    let mut seed = Document::new();
    for condition in filter.conditions() {
        if let Condition::Eq { field, value } = condition {
            seed.insert(field.clone(), value.clone());
        }
    }
    seed.extend(set.clone());
    seed
}

fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        insert_into(docs, collection, document)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(UpdateResult::default());
        };

        if let Some(id) = existing.get(ID_FIELD) {
            replacement.insert(ID_FIELD.to_string(), id.clone());
        }
        let modified = *existing != replacement;
        *existing = replacement;

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult::default());
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult::default());
        };

        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok(DeleteResult {
            deleted_count: (before - docs.len()) as u64,
        })
    }

    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<WriteOperation>,
    ) -> Result<BulkWriteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut result = BulkWriteResult::default();

        for operation in operations {
            match operation {
                WriteOperation::InsertOne { document } => {
                    insert_into(docs, collection, document)?;
                    result.inserted_count += 1;
                }
                WriteOperation::UpdateOne {
                    filter,
                    set,
                    upsert,
                } => {
                    if let Some(existing) = docs.iter_mut().find(|d| filter.matches(d)) {
                        result.matched_count += 1;
                        let before = existing.clone();
                        existing.extend(set);
                        if *existing != before {
                            result.modified_count += 1;
                        }
                    } else if upsert {
                        insert_into(docs, collection, upsert_seed(&filter, &set))?;
                        result.upserted_count += 1;
                    }
                }
            }
        }

        Ok(result)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs = {
            let collections = self.collections.read().await;
            collections.get(collection).cloned().unwrap_or_default()
        };

        for stage in pipeline.stages() {
            match stage {
                Stage::Match(filter) => docs.retain(|d| filter.matches(d)),
                Stage::Sort { field, order } => docs.sort_by(|a, b| {
                    let ordering = compare_field(a, b, field);
                    match order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    }
                }),
                Stage::Project(fields) => {
                    for doc in &mut docs {
                        doc.retain(|key, _| key == ID_FIELD || fields.iter().any(|f| f == key));
                    }
                }
            }
        }

        Ok(docs)
    }
}
