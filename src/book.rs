use std::{fmt, str::FromStr};

use mongodb::bson::oid::ObjectId;
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("`{id}` is not a valid book id, expected a 24 character hex string")]
pub struct BookIdError {
    id: String,
}

/// Storage-assigned primary key of a book.
///
/// Travels over the wire as its hex representation. Deserializing a malformed
/// string fails, so handlers never see an invalid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId(ObjectId);

impl BookId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for BookId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl FromStr for BookId {
    type Err = BookIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| BookIdError { id: s.to_string() })
    }
}

impl TryFrom<String> for BookId {
    type Error = BookIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookId> for String {
    fn from(id: BookId) -> Self {
        id.0.to_hex()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl JsonSchema for BookId {
    fn schema_name() -> String {
        "BookId".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// The data fields of a book, without its identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub isbn: String,
    pub pages: i32,
    pub year: i32,
}

impl NewBook {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        pages: i32,
        year: i32,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            isbn: isbn.into(),
            pages,
            year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub fields: NewBook,
}
