use serde::Serialize;

use crate::book::{Book, BookId, NewBook};

pub mod app;
pub mod create_book;
pub mod delete_book;
pub mod list_books;
pub mod update_book;

/// A book as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub pages: i32,
    pub year: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isbn: String,
}

impl BookResponse {
    pub fn new(id: BookId, fields: NewBook) -> Self {
        Self {
            id,
            name: fields.name,
            author: fields.author,
            pages: fields.pages,
            year: fields.year,
            isbn: fields.isbn,
        }
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self::new(book.id, book.fields)
    }
}
