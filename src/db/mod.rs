//! Persistence module split across logical submodules.
//!
//! Each submodule exposes two layers: free functions that run one statement
//! against a borrowed [`rusqlite::Connection`], and a repository that opens a
//! connection per call, delegates to those functions and logs the outcome.

mod books;
mod connection;
mod copies;
mod labels;

pub use books::{delete_book, fetch_book, fetch_books, insert_book, update_book, BookRepository};
pub use connection::Database;
pub use copies::{
    delete_copy, fetch_available_copies, fetch_copies, fetch_copy, fetch_copy_summaries,
    insert_copy, update_copy, CopyRepository,
};
