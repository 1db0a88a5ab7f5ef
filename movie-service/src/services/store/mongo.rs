use super::{DocumentStore, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            map_mongo_error(e)
        })?;
        client_options.app_name = Some("movie-service".to_string());

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            map_mongo_error(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Surfaces unique index violations as `DuplicateKey`, both on writes and on
/// index builds over existing duplicates; everything else is a backend failure.
fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            StoreError::DuplicateKey(write_error.message.clone())
        }
        ErrorKind::Command(ref command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            StoreError::DuplicateKey(command_error.message.clone())
        }
        _ => StoreError::Backend(anyhow::Error::new(err)),
    }
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(filter, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to query documents: {}", e);
                map_mongo_error(e)
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!(collection = %collection, "Failed to collect documents: {}", e);
            map_mongo_error(e)
        })
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let result = self
            .collection(collection)
            .insert_one(doc, None)
            .await
            .map_err(map_mongo_error)?;
        Ok(id_to_string(result.inserted_id))
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection(collection)
            .find_one_and_update(filter, update, options)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to update document: {}", e);
                map_mongo_error(e)
            })
    }

    async fn remove(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_many(filter, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to delete documents: {}", e);
                map_mongo_error(e)
            })?;
        Ok(result.deleted_count)
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(
                IndexOptions::builder()
                    .name(format!("{}_unique_idx", field))
                    .unique(true)
                    .build(),
            )
            .build();

        self.collection(collection)
            .create_index(index, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, field = %field, "Failed to create index: {}", e);
                map_mongo_error(e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                map_mongo_error(e)
            })?;
        Ok(())
    }
}
