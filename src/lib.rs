pub mod book;
pub mod cli_args;
pub mod error;
mod extractor;
pub mod launcher;
mod middleware;
mod route;
pub mod seed;
pub mod server;
pub mod service;
mod state;
pub mod store;
