//! Document store seam: traits, query vocabulary and backends

mod error;
mod memory;
#[cfg(feature = "mongo")]
mod mongo;
mod query;
mod traits;

pub use error::StoreError;
pub use memory::MemoryDocumentStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoDocumentStore;
pub use query::{Condition, Filter, Pipeline, SortOrder, Stage, compare_values};
pub use traits::{BulkWriteResult, DeleteResult, DocumentStore, UpdateResult, WriteOperation};

/// A stored document: a JSON object
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Primary key field of every stored document
pub const ID_FIELD: &str = "_id";

/// Convert a serializable value into a [`Document`]
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Deserialize a stored [`Document`]
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}

/// Replace `_id` with a string `id` field, as returned to API callers
pub fn expose_id(mut doc: Document) -> Document {
    if let Some(id) = doc.remove(ID_FIELD) {
        let id = match id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        doc.insert("id".to_string(), serde_json::Value::String(id));
    }
    doc
}
