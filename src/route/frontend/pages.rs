use axum::{extract::State, http::StatusCode, response::Html};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    book::Book, error::ApiError, extractor::query::ApiQuery, server_error, state::ApiState,
};

use super::views;

async fn all_books(state: &ApiState) -> Result<Vec<Book>, ApiError> {
    let books = state.books().list().await.map_err(server_error!(state))?;

    Ok(books)
}

pub async fn index() -> Html<String> {
    Html(views::index())
}

pub async fn books(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    let books = all_books(&state).await?;

    Ok(Html(views::book_table("Books", &books)))
}

pub async fn authors(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    let books = all_books(&state).await?;
    let authors = books.iter().map(|book| book.fields.author.clone());

    Ok(Html(views::single_column_table("Authors", "Author", authors)))
}

pub async fn years(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    let books = all_books(&state).await?;
    let years = books.iter().map(|book| book.fields.year.to_string());

    Ok(Html(views::single_column_table("Years", "Year", years)))
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// Case-insensitive text matched against name and author.
    pub q: Option<String>,
}

pub async fn search(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let term = query.q.unwrap_or_default();
    let term = term.trim();

    if term.is_empty() {
        return Ok(Html(views::search_page(term, None)));
    }

    let needle = term.to_lowercase();
    let matches: Vec<Book> = all_books(&state)
        .await?
        .into_iter()
        .filter(|book| {
            book.fields.name.to_lowercase().contains(&needle)
                || book.fields.author.to_lowercase().contains(&needle)
        })
        .collect();

    tracing::debug!(%term, count = matches.len(), "Search");

    Ok(Html(views::search_page(term, Some(&matches))))
}

/// Placeholder for a creation form, books are created through the POST service.
pub async fn create() -> StatusCode {
    StatusCode::NO_CONTENT
}
