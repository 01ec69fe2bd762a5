use async_trait::async_trait;

use crate::book::{Book, BookId, NewBook};

#[cfg(test)]
pub mod memory;
pub mod mongo;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Failed to create collection `{collection}`: {source}")]
    CreateCollection {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("A book with identical fields is already stored")]
    Duplicate,
}

/// Result of an insert that is skipped when an identical record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(BookId),
    Existing(BookId),
}

/// Access to the shared books collection.
///
/// "Exact" operations match on all five data fields of a [`NewBook`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Returns every book in storage order.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    /// Counts the books whose fields all equal `book`.
    async fn count_exact(&self, book: &NewBook) -> Result<u64, StoreError>;

    /// Inserts `book` unless a book with identical fields exists.
    ///
    /// Identical books are rejected by storage, so concurrent inserts store one copy.
    async fn insert_if_absent(&self, book: &NewBook) -> Result<InsertOutcome, StoreError>;

    /// Replaces all fields of the book with the given id. Returns `false` if no book matched.
    ///
    /// Fails with [`StoreError::Duplicate`] if another book already has the new fields.
    async fn replace(&self, id: BookId, book: &NewBook) -> Result<bool, StoreError>;

    /// Deletes the book with the given id. Returns `false` if no book matched.
    async fn delete(&self, id: BookId) -> Result<bool, StoreError>;
}
