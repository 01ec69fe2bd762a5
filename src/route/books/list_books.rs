use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::ApiError, server_error, state::ApiState};

use super::BookResponse;

#[derive(Debug)]
pub struct ListBooksResponse {
    pub books: Vec<BookResponse>,
}

impl IntoResponse for ListBooksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.books)).into_response()
    }
}

pub async fn list_books(State(state): State<ApiState>) -> Result<ListBooksResponse, ApiError> {
    let books = state.books().list().await.map_err(server_error!(state))?;

    tracing::debug!(count = books.len(), "Listing books");

    Ok(ListBooksResponse {
        books: books.into_iter().map(BookResponse::from).collect(),
    })
}
