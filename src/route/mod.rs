pub mod books;
pub mod frontend;
