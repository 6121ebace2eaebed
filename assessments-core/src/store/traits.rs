//! Storage traits for the assessment document store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Document, Filter, Pipeline, StoreError};

/// Outcome of a replace or update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Summary of a bulk write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkWriteResult {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
}

/// A single operation inside a bulk write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    InsertOne {
        document: Document,
    },
    /// Set the given fields on the first match, inserting when `upsert` is
    /// true and nothing matches
    UpdateOne {
        filter: Filter,
        set: Document,
        upsert: bool,
    },
}

/// Document store operations, keyed by collection name
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, returns its `_id`
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// First document matching the filter
    async fn find_one(&self, collection: &str, filter: &Filter)
    -> Result<Option<Document>, StoreError>;

    /// All documents matching the filter, in insertion order
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Replace the first match wholesale, keeping its `_id`
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, collection: &str, filter: &Filter)
    -> Result<DeleteResult, StoreError>;

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError>;

    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<WriteOperation>,
    ) -> Result<BulkWriteResult, StoreError>;

    /// Run an aggregation pipeline
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError>;
}
