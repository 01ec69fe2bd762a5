use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    book::BookId,
    error::{ErrorVerbosityProvider, ResourceError, ResourceErrorProvider},
    extractor::path::ApiPath,
    server_error,
    state::ApiState,
};

#[derive(Debug, Serialize)]
pub struct DeleteBookResponse {
    pub message: &'static str,
    pub id: BookId,
}

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum DeleteBookErrorType {
    NotFound {
        #[serde(skip)]
        id: BookId,
    },
}

#[derive(Debug, Serialize)]
pub struct DeleteBookErrorContext {
    pub reason: String,
}

impl ResourceErrorProvider for DeleteBookErrorType {
    type Context = DeleteBookErrorContext;

    fn status_code(&self) -> StatusCode {
        match self {
            DeleteBookErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            DeleteBookErrorType::NotFound { .. } => "Book not found",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            DeleteBookErrorType::NotFound { id } => DeleteBookErrorContext {
                reason: format!("Book with id {id} not found"),
            },
        }
    }
}

/// Deletes the book whose primary key is the path id. Malformed ids are rejected by [`ApiPath`].
pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<BookId>,
) -> Result<DeleteBookResponse, ResourceError<DeleteBookErrorType>> {
    let deleted = state
        .books()
        .delete(id)
        .await
        .map_err(server_error!(state))?;

    if !deleted {
        tracing::debug!(%id, "Book to delete not found");

        return Err(ResourceError::new(
            state.error_verbosity(),
            DeleteBookErrorType::NotFound { id },
        ));
    }

    tracing::info!(%id, "Book deleted");

    Ok(DeleteBookResponse {
        message: "Book deleted successfully",
        id,
    })
}
