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
    store::InsertOutcome,
};

use super::BookResponse;

/// Fields that are missing from the request are stored empty or zero.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CreateBookRequest {
    pub name: String,
    pub author: String,
    pub pages: i32,
    pub year: i32,
    pub isbn: String,
}

impl From<CreateBookRequest> for NewBook {
    fn from(request: CreateBookRequest) -> Self {
        NewBook {
            name: request.name,
            author: request.author,
            isbn: request.isbn,
            pages: request.pages,
            year: request.year,
        }
    }
}

#[derive(Debug)]
pub struct CreateBookResponse {
    pub book: BookResponse,
}

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.book)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum CreateBookErrorType {
    AlreadyExists {
        #[serde(skip)]
        id: BookId,
    },
}

#[derive(Debug, Serialize)]
pub struct CreateBookErrorContext {
    pub reason: String,
    pub existing_id: BookId,
}

impl ResourceErrorProvider for CreateBookErrorType {
    type Context = CreateBookErrorContext;

    fn status_code(&self) -> StatusCode {
        match self {
            CreateBookErrorType::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            CreateBookErrorType::AlreadyExists { .. } => "Book already exists",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            CreateBookErrorType::AlreadyExists { id } => CreateBookErrorContext {
                reason: format!("A book with identical fields is stored with id {id}"),
                existing_id: *id,
            },
        }
    }
}

/// Creates a book unless one with the exact same fields is stored.
pub async fn create_book(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<CreateBookRequest>,
) -> Result<CreateBookResponse, ResourceError<CreateBookErrorType>> {
    let book = NewBook::from(request);

    let outcome = state
        .books()
        .insert_if_absent(&book)
        .await
        .map_err(server_error!(state))?;

    match outcome {
        InsertOutcome::Inserted(id) => {
            tracing::info!(%id, name = %book.name, "Book created");

            Ok(CreateBookResponse {
                book: BookResponse::new(id, book),
            })
        }
        InsertOutcome::Existing(id) => {
            tracing::debug!(%id, name = %book.name, "Book already exists");

            Err(ResourceError::new(
                state.error_verbosity(),
                CreateBookErrorType::AlreadyExists { id },
            ))
        }
    }
}
