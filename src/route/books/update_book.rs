use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    book::{BookId, NewBook},
    error::{ErrorVerbosityProvider, ResourceError, ResourceErrorProvider},
    extractor::json::ApiJson,
    server_error,
    state::ApiState,
    store::StoreError,
};

use super::BookResponse;

/// Full replacement of a stored book. Only `id` is required.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBookRequest {
    pub id: BookId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub pages: i32,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub isbn: String,
}

impl UpdateBookRequest {
    fn into_parts(self) -> (BookId, NewBook) {
        let fields = NewBook {
            name: self.name,
            author: self.author,
            isbn: self.isbn,
            pages: self.pages,
            year: self.year,
        };

        (self.id, fields)
    }
}

#[derive(Debug)]
pub struct UpdateBookResponse {
    pub book: BookResponse,
}

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.book)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum UpdateBookErrorType {
    NotFound {
        #[serde(skip)]
        id: BookId,
    },
    AlreadyExists {
        #[serde(skip)]
        id: BookId,
    },
}

#[derive(Debug, Serialize)]
pub struct UpdateBookErrorContext {
    pub reason: String,
}

impl ResourceErrorProvider for UpdateBookErrorType {
    type Context = UpdateBookErrorContext;

    fn status_code(&self) -> StatusCode {
        match self {
            UpdateBookErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
            UpdateBookErrorType::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            UpdateBookErrorType::NotFound { .. } => "Book not found",
            UpdateBookErrorType::AlreadyExists { .. } => "Book already exists",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            UpdateBookErrorType::NotFound { id } => UpdateBookErrorContext {
                reason: format!("Book with id {id} not found"),
            },
            UpdateBookErrorType::AlreadyExists { id } => UpdateBookErrorContext {
                reason: format!("Another book has the fields requested for book {id}"),
            },
        }
    }
}

pub async fn update_book(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<UpdateBookRequest>,
) -> Result<UpdateBookResponse, ResourceError<UpdateBookErrorType>> {
    let (id, book) = request.into_parts();

    let replaced = match state.books().replace(id, &book).await {
        Err(StoreError::Duplicate) => {
            tracing::debug!(%id, "Update would duplicate another book");

            return Err(ResourceError::new(
                state.error_verbosity(),
                UpdateBookErrorType::AlreadyExists { id },
            ));
        }
        result => result.map_err(server_error!(state))?,
    };

    if !replaced {
        tracing::debug!(%id, "Book to update not found");

        return Err(ResourceError::new(
            state.error_verbosity(),
            UpdateBookErrorType::NotFound { id },
        ));
    }

    tracing::info!(%id, "Book updated");

    Ok(UpdateBookResponse {
        book: BookResponse::new(id, book),
    })
}
