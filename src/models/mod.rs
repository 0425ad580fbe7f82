//! Data models for the library server

pub mod book;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookQuery, CreateBook, UpdateBook};
