use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::ApiState;

pub fn list_app() -> Router<ApiState> {
    Router::<ApiState>::new().route("/api/books", get(super::list_books::list_books))
}

pub fn create_app() -> Router<ApiState> {
    Router::<ApiState>::new().route("/api/books", post(super::create_book::create_book))
}

pub fn update_app() -> Router<ApiState> {
    Router::<ApiState>::new().route("/api/books", put(super::update_book::update_book))
}

pub fn delete_app() -> Router<ApiState> {
    Router::<ApiState>::new().route("/api/books/:id", delete(super::delete_book::delete_book))
}
