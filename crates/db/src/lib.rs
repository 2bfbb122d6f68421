//! Store interface for authors and books, with MongoDB and in-memory backends.

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_kernel::settings::{DatabaseSettings, StoreBackend};
use thiserror::Error;

pub mod coerce;
pub mod memory;
pub mod mongo;
pub mod records;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use mongodb::bson::oid::ObjectId;
pub use records::{Author, AuthorRef, Book, BookPatch, NewAuthor, NewBook};

/// Errors raised by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cast to ObjectId failed for value \"{0}\"")]
    InvalidId(String),

    #[error("store did not return an identifier for the inserted {0}")]
    MissingInsertedId(&'static str),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle passed to every route handler.
pub type SharedStore = Arc<dyn Store>;

/// Parse a client-supplied identifier.
pub fn parse_id(raw: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// One round trip per call; no operation spans more than one collection
/// except [`Store::find_book_populated`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    async fn list_authors(&self) -> StoreResult<Vec<Author>>;

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Author>;

    async fn find_author(&self, id: ObjectId) -> StoreResult<Option<Author>>;

    /// All books with `author` left as the raw identifier.
    async fn list_books(&self) -> StoreResult<Vec<Book>>;

    async fn find_book(&self, id: ObjectId) -> StoreResult<Option<Book>>;

    /// Fetch a book and resolve its author reference. A reference to a
    /// missing author resolves to `None`.
    async fn find_book_populated(&self, id: ObjectId) -> StoreResult<Option<Book>> {
        let Some(mut book) = self.find_book(id).await? else {
            return Ok(None);
        };

        book.author = match book.author.take() {
            Some(reference) => self
                .find_author(reference.id())
                .await?
                .map(|author| AuthorRef::Populated(Box::new(author))),
            None => None,
        };

        Ok(Some(book))
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book>;

    /// Apply `patch` and return the updated record, or `None` if no book has `id`.
    async fn update_book(&self, id: ObjectId, patch: BookPatch) -> StoreResult<Option<Book>>;

    /// Remove the book, returning whether one existed.
    async fn delete_book(&self, id: ObjectId) -> StoreResult<bool>;
}

/// Build the configured store.
///
/// The Mongo client connects lazily; a failed startup ping is logged and the
/// service keeps running so requests report the failure themselves.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match settings.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Mongo => Arc::new(MongoStore::connect(settings).await?),
    };

    match store.ping().await {
        Ok(()) => tracing::info!(
            backend = store.backend(),
            database = %settings.name,
            "connected to store"
        ),
        Err(error) => tracing::error!(
            backend = store.backend(),
            database = %settings.name,
            %error,
            "error connecting to store"
        ),
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_malformed_identifiers() {
        assert!(parse_id("65a1f0c2e4b0a1b2c3d4e5f6").is_ok());

        let err = parse_id("not-an-id").unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(ref raw) if raw == "not-an-id"));
    }

    #[tokio::test]
    async fn connect_builds_memory_backend() {
        let settings = DatabaseSettings {
            backend: StoreBackend::Memory,
            ..DatabaseSettings::default()
        };

        let store = connect(&settings).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.list_books().await.unwrap().is_empty());
    }
}
