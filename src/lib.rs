//! Data-access layer for the BiblioTrack library catalog.
//!
//! Books (`livre`) and their physical copies (`exemplaire`) live in SQLite.
//! Every repository call opens its own connection, runs one statement and
//! returns a typed result, so front-ends can tell "not found" apart from a
//! constraint violation or an unreachable database.
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;

pub use config::{AppConfig, DatabaseConfig};
pub use db::{BookRepository, CopyRepository, Database};
pub use error::{LibraryError, LibraryResult};
pub use models::{Book, BookChanges, BookCopy, Category, Condition, CopyChanges, CopySummary};
