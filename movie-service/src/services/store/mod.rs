//! Document store abstraction.
//!
//! Handlers never talk to a database client directly; they go through a
//! `DocumentStore` handed to `MovieService` at construction, which lets the
//! MongoDB backend be swapped for the in-memory one in tests and local runs.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::Document;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(msg) => AppError::Conflict(anyhow::anyhow!(msg)),
            StoreError::InvalidUpdate(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            other => AppError::DatabaseError(anyhow::Error::new(other)),
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Asynchronous CRUD over BSON documents grouped into named collections.
///
/// Filters are equality matches on top-level fields. Updates accept the
/// `$set` and `$push` operators and apply to the first matching document
/// atomically.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError>;

    /// Inserts `doc` and returns its generated `_id` as a string.
    async fn insert(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    /// Returns the document as it is after the update, or `None` when nothing matched.
    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Removes every matching document and returns how many were removed.
    async fn remove(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
