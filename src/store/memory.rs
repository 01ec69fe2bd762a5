use std::sync::Mutex;

use async_trait::async_trait;

use crate::book::{Book, BookId, NewBook};

use super::{BookRepository, InsertOutcome, StoreError};

/// In-process stand-in for the shared collection.
#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unconditionally, allowing duplicates.
    pub fn push(&self, fields: NewBook) -> BookId {
        let id = BookId::new();

        self.books.lock().unwrap().push(Book { id, fields });

        id
    }

    pub fn snapshot(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookRepository for MemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.snapshot())
    }

    async fn count_exact(&self, book: &NewBook) -> Result<u64, StoreError> {
        let books = self.books.lock().unwrap();

        Ok(books.iter().filter(|stored| &stored.fields == book).count() as u64)
    }

    async fn insert_if_absent(&self, book: &NewBook) -> Result<InsertOutcome, StoreError> {
        let mut books = self.books.lock().unwrap();

        if let Some(existing) = books.iter().find(|stored| &stored.fields == book) {
            return Ok(InsertOutcome::Existing(existing.id));
        }

        let id = BookId::new();
        books.push(Book {
            id,
            fields: book.clone(),
        });

        Ok(InsertOutcome::Inserted(id))
    }

    async fn replace(&self, id: BookId, book: &NewBook) -> Result<bool, StoreError> {
        let mut books = self.books.lock().unwrap();

        let Some(position) = books.iter().position(|stored| stored.id == id) else {
            return Ok(false);
        };

        if books
            .iter()
            .any(|stored| stored.id != id && &stored.fields == book)
        {
            return Err(StoreError::Duplicate);
        }

        books[position].fields = book.clone();

        Ok(true)
    }

    async fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        let mut books = self.books.lock().unwrap();
        let before = books.len();

        books.retain(|stored| stored.id != id);

        Ok(books.len() < before)
    }
}

/// Fails every operation as if the database were unreachable.
pub struct UnreachableBookStore;

impl UnreachableBookStore {
    fn error() -> StoreError {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");

        StoreError::Database(mongodb::error::Error::from(io))
    }
}

#[async_trait]
impl BookRepository for UnreachableBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Err(Self::error())
    }

    async fn count_exact(&self, _book: &NewBook) -> Result<u64, StoreError> {
        Err(Self::error())
    }

    async fn insert_if_absent(&self, _book: &NewBook) -> Result<InsertOutcome, StoreError> {
        Err(Self::error())
    }

    async fn replace(&self, _id: BookId, _book: &NewBook) -> Result<bool, StoreError> {
        Err(Self::error())
    }

    async fn delete(&self, _id: BookId) -> Result<bool, StoreError> {
        Err(Self::error())
    }
}
