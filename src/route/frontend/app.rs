use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::state::ApiState;

use super::pages;

pub fn app(assets_dir: &Path) -> Router<ApiState> {
    Router::<ApiState>::new()
        .route("/", get(pages::index))
        .route("/books", get(pages::books))
        .route("/authors", get(pages::authors))
        .route("/years", get(pages::years))
        .route("/search", get(pages::search))
        .route("/create", get(pages::create))
        .nest_service("/css", ServeDir::new(assets_dir))
}
