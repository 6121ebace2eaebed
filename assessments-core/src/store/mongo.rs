//! MongoDB-backed document store (feature `mongo`)

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document as BsonDocument, doc};
use mongodb::options::UpdateOptions;
use mongodb::{Client, Collection, Database};
use serde_json::Value;

use super::traits::{BulkWriteResult, DeleteResult, DocumentStore, UpdateResult, WriteOperation};
use super::{Document, Filter, ID_FIELD, Pipeline, StoreError};

/// Document store talking to a MongoDB database
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// Connect to `uri` and use `database`
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(backend)?;
        tracing::info!(database, "Connected to MongoDB");
        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.db.collection::<BsonDocument>(name)
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn to_bson(doc: &Document) -> Result<BsonDocument, StoreError> {
    bson::to_document(doc).map_err(backend)
}

fn to_bson_value(value: &Value) -> Result<BsonDocument, StoreError> {
    bson::to_document(value).map_err(backend)
}

/// ObjectId keys come back as their hex string
fn from_bson(mut doc: BsonDocument) -> Result<Document, StoreError> {
    let oid_hex = match doc.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        _ => None,
    };
    if let Some(hex) = oid_hex {
        doc.insert(ID_FIELD, hex);
    }
    bson::from_document(doc).map_err(backend)
}

fn filter_to_bson(filter: &Filter) -> Result<BsonDocument, StoreError> {
    to_bson_value(&filter.to_json()).map(widen_id_clause)
}

/// Values an `_id` string may be stored as: 24-hex ids may be ObjectIds
fn id_candidates(value: Bson) -> Vec<Bson> {
    match value {
        Bson::String(s) => match ObjectId::parse_str(&s) {
            Ok(oid) => vec![Bson::ObjectId(oid), Bson::String(s)],
            Err(_) => vec![Bson::String(s)],
        },
        other => vec![other],
    }
}

/// Let `_id` equality and `$in` clauses match ObjectId keys as well as strings
fn widen_id_clause(mut query: BsonDocument) -> BsonDocument {
    let Some(clause) = query.remove(ID_FIELD) else {
        return query;
    };

    let widened = match clause {
        Bson::Document(mut ops) => {
            if let Some(Bson::Array(values)) = ops.remove("$in") {
                let values: Vec<Bson> = values.into_iter().flat_map(id_candidates).collect();
                ops.insert("$in", values);
            }
            Bson::Document(ops)
        }
        scalar => {
            let mut candidates = id_candidates(scalar);
            if candidates.len() == 1 {
                candidates.remove(0)
            } else {
                Bson::Document(doc! { "$in": candidates })
            }
        }
    };
    query.insert(ID_FIELD, widened);
    query
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let bson_doc = to_bson(&document)?;
        let result = self
            .collection(collection)
            .insert_one(bson_doc, None)
            .await
            .map_err(backend)?;

        Ok(match document.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            _ => match result.inserted_id {
                bson::Bson::String(id) => id,
                bson::Bson::ObjectId(oid) => oid.to_hex(),
                other => other.to_string(),
            },
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one(filter_to_bson(filter)?, None)
            .await
            .map_err(backend)?
            .map(from_bson)
            .transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(filter_to_bson(filter)?, None)
            .await
            .map_err(backend)?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await.map_err(backend)?;
        docs.into_iter().map(from_bson).collect()
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
    ) -> Result<UpdateResult, StoreError> {
        replacement.remove(ID_FIELD);
        let result = self
            .collection(collection)
            .replace_one(filter_to_bson(filter)?, to_bson(&replacement)?, None)
            .await
            .map_err(backend)?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(filter_to_bson(filter)?, None)
            .await
            .map_err(backend)?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let result = self
            .collection(collection)
            .delete_many(filter_to_bson(filter)?, None)
            .await
            .map_err(backend)?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }

    // Issued one operation at a time: the 2.x driver has no client-side bulk API.
    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<WriteOperation>,
    ) -> Result<BulkWriteResult, StoreError> {
        let coll = self.collection(collection);
        let mut summary = BulkWriteResult::default();

        for operation in operations {
            match operation {
                WriteOperation::InsertOne { document } => {
                    coll.insert_one(to_bson(&document)?, None)
                        .await
                        .map_err(backend)?;
                    summary.inserted_count += 1;
                }
                WriteOperation::UpdateOne {
                    filter,
                    set,
                    upsert,
                } => {
                    let mut update = BsonDocument::new();
                    update.insert("$set", to_bson(&set)?);
                    let options = UpdateOptions::builder().upsert(upsert).build();
                    let result = coll
                        .update_one(filter_to_bson(&filter)?, update, options)
                        .await
                        .map_err(backend)?;

                    summary.matched_count += result.matched_count;
                    summary.modified_count += result.modified_count;
                    if result.upserted_id.is_some() {
                        summary.upserted_count += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        let stages = pipeline
            .to_json()
            .iter()
            .map(to_bson_value)
            .collect::<Result<Vec<_>, _>>()?;

        let cursor = self
            .collection(collection)
            .aggregate(stages, None)
            .await
            .map_err(backend)?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await.map_err(backend)?;
        docs.into_iter().map(from_bson).collect()
    }
}
