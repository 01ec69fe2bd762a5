use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::Deserialize;

use crate::book::{Book, BookId, NewBook};

use super::{BookRepository, InsertOutcome, StoreError};

/// A book as laid out in the collection.
///
/// Field names match the documents already written by the other services
/// sharing the collection.
#[derive(Debug, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "bookname", default)]
    name: String,
    #[serde(rename = "bookauthor", default)]
    author: String,
    #[serde(rename = "bookisbn", default)]
    isbn: String,
    #[serde(rename = "bookpages", default)]
    pages: i32,
    #[serde(rename = "bookyear", default)]
    year: i32,
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: BookId::from(document.id),
            fields: NewBook {
                name: document.name,
                author: document.author,
                isbn: document.isbn,
                pages: document.pages,
                year: document.year,
            },
        }
    }
}

const NAMESPACE_EXISTS: i32 = 48;
const DUPLICATE_KEY: i32 = 11000;

const FIELDS_INDEX: &str = "book_fields_unique";

/// The server error code of a failed command or single write, if any.
fn server_error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        _ => None,
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    server_error_code(err) == Some(DUPLICATE_KEY)
}

fn fields_document(book: &NewBook) -> Document {
    doc! {
        "bookname": book.name.as_str(),
        "bookauthor": book.author.as_str(),
        "bookisbn": book.isbn.as_str(),
        "bookpages": book.pages,
        "bookyear": book.year,
    }
}

pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    /// Connects to the database and makes sure the collection exists.
    ///
    /// `connect_timeout` bounds connection establishment and server selection.
    #[tracing::instrument(name = "mongo_connect", skip(uri))]
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(database);

        database.run_command(doc! { "ping": 1 }, None).await?;
        tracing::debug!("Database reachable");

        ensure_collection(&database, collection).await?;

        let collection = database.collection(collection);

        ensure_fields_index(&collection).await?;

        Ok(Self { collection })
    }
}

#[tracing::instrument(skip(database))]
async fn ensure_collection(database: &Database, collection: &str) -> Result<(), StoreError> {
    let names = database.list_collection_names(None).await?;

    if names.iter().any(|name| name == collection) {
        tracing::debug!("Collection exists");

        return Ok(());
    }

    let result = database.create_collection(collection, None).await;

    created_or_exists(result, collection)
}

/// Another service starting at the same time may create the collection first.
fn created_or_exists(result: Result<(), MongoError>, collection: &str) -> Result<(), StoreError> {
    match result {
        Ok(()) => {
            tracing::info!("Collection created");

            Ok(())
        }
        Err(err) if server_error_code(&err) == Some(NAMESPACE_EXISTS) => {
            tracing::debug!("Collection created concurrently");

            Ok(())
        }
        Err(source) => Err(StoreError::CreateCollection {
            collection: collection.to_string(),
            source,
        }),
    }
}

fn fields_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! {
            "bookname": 1,
            "bookauthor": 1,
            "bookisbn": 1,
            "bookpages": 1,
            "bookyear": 1,
        })
        .options(
            IndexOptions::builder()
                .name(FIELDS_INDEX.to_string())
                .unique(true)
                .build(),
        )
        .build()
}

/// Makes identical books impossible to store twice, even across processes.
///
/// Collections that already hold identical books keep working without the index.
#[tracing::instrument(skip_all)]
async fn ensure_fields_index(collection: &Collection<BookDocument>) -> Result<(), StoreError> {
    match collection.create_index(fields_index(), None).await {
        Ok(_) => {
            tracing::debug!(index = FIELDS_INDEX, "Index ready");

            Ok(())
        }
        Err(err) if is_duplicate_key(&err) => {
            tracing::warn!(index = FIELDS_INDEX, %err, "Collection holds identical books, index not created");

            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl BookRepository for MongoBookStore {
    #[tracing::instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let documents: Vec<BookDocument> = self
            .collection
            .find(None, None)
            .await?
            .try_collect()
            .await?;

        tracing::trace!(count = documents.len(), "Listed");

        Ok(documents.into_iter().map(Book::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn count_exact(&self, book: &NewBook) -> Result<u64, StoreError> {
        let count = self
            .collection
            .count_documents(fields_document(book), None)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn insert_if_absent(&self, book: &NewBook) -> Result<InsertOutcome, StoreError> {
        let id = ObjectId::new();

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        // An upsert copies the equality fields of the filter into the new document.
        // `Before` yields no document when the upsert inserted.
        let result = self
            .collection
            .find_one_and_update(
                fields_document(book),
                doc! { "$setOnInsert": { "_id": id } },
                options,
            )
            .await;

        match result {
            Ok(Some(existing)) => Ok(InsertOutcome::Existing(BookId::from(existing.id))),
            Ok(None) => Ok(InsertOutcome::Inserted(BookId::from(id))),
            // A concurrent upsert of the same fields won the unique index.
            Err(err) if is_duplicate_key(&err) => {
                tracing::debug!("Concurrent insert of identical book");

                match self.collection.find_one(fields_document(book), None).await? {
                    Some(existing) => Ok(InsertOutcome::Existing(BookId::from(existing.id))),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn replace(&self, id: BookId, book: &NewBook) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": fields_document(book) },
                None,
            )
            .await
            .map_err(|err| {
                if is_duplicate_key(&err) {
                    StoreError::Duplicate
                } else {
                    StoreError::Database(err)
                }
            })?;

        tracing::trace!(
            matched = result.matched_count,
            modified = result.modified_count,
            "Updated"
        );

        Ok(result.matched_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;

        tracing::trace!(deleted = result.deleted_count, "Deleted");

        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use mongodb::{
        bson,
        error::{CommandError, WriteError},
    };

    use super::*;

    fn command_error(code: i32, code_name: &str) -> MongoError {
        let error: CommandError = bson::from_document(doc! {
            "code": code,
            "codeName": code_name,
            "errmsg": "command failed",
        })
        .expect("command error document");

        MongoError::from(ErrorKind::Command(error))
    }

    fn write_error(code: i32) -> MongoError {
        let error: WriteError = bson::from_document(doc! {
            "code": code,
            "errmsg": "write failed",
        })
        .expect("write error document");

        MongoError::from(ErrorKind::Write(WriteFailure::WriteError(error)))
    }

    #[test]
    fn collection_created_by_another_service_is_fine() {
        let result = created_or_exists(
            Err(command_error(NAMESPACE_EXISTS, "NamespaceExists")),
            "information",
        );

        assert!(result.is_ok());
        assert!(created_or_exists(Ok(()), "information").is_ok());
    }

    #[test]
    fn other_collection_creation_failures_are_reported() {
        let result = created_or_exists(Err(command_error(13, "Unauthorized")), "information");

        assert!(matches!(
            result,
            Err(StoreError::CreateCollection { collection, .. }) if collection == "information"
        ));
    }

    #[test]
    fn duplicate_key_is_recognized_from_commands_and_writes() {
        assert!(is_duplicate_key(&command_error(DUPLICATE_KEY, "DuplicateKey")));
        assert!(is_duplicate_key(&write_error(DUPLICATE_KEY)));
        assert!(!is_duplicate_key(&write_error(121)));
        assert!(!is_duplicate_key(&command_error(NAMESPACE_EXISTS, "NamespaceExists")));
    }

    #[test]
    fn fields_index_is_unique_over_all_fields() {
        let index = fields_index();
        let keys: Vec<&str> = index.keys.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            ["bookname", "bookauthor", "bookisbn", "bookpages", "bookyear"]
        );
        assert_eq!(index.options.and_then(|options| options.unique), Some(true));
    }

    #[test]
    fn fields_use_collection_names() {
        let document = fields_document(&NewBook::new("Dune", "Frank Herbert", "", 412, 1965));

        assert_eq!(document.get_str("bookname").ok(), Some("Dune"));
        assert_eq!(document.get_str("bookauthor").ok(), Some("Frank Herbert"));
        assert_eq!(document.get_str("bookisbn").ok(), Some(""));
        assert_eq!(document.get_i32("bookpages").ok(), Some(412));
        assert_eq!(document.get_i32("bookyear").ok(), Some(1965));
    }

    #[test]
    fn decodes_documents_with_missing_fields() {
        let id = ObjectId::new();
        let document = doc! { "_id": id, "bookname": "Untitled", "bookyear": 2001_i64 };

        let book = Book::from(bson::from_document::<BookDocument>(document).expect("decodable"));

        assert_eq!(book.id, BookId::from(id));
        assert_eq!(book.fields, NewBook::new("Untitled", "", "", 0, 2001));
    }
}
