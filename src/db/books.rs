use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, error, info, warn};

use crate::error::LibraryResult;
use crate::models::{Book, BookChanges};

use super::Database;

/// Book columns as selected from `livre l`. The creation date is aliased so
/// it cannot collide with `exemplaire.date_creation` in joined queries.
pub(super) const BOOK_COLUMNS: &str = "l.isbn, l.titre, l.auteur, l.categorie, l.nombre_pages, \
     l.nombre_exemplaires, l.date_creation AS livre_date_creation";

pub(super) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        isbn: row.get("isbn")?,
        title: row.get("titre")?,
        author: row.get("auteur")?,
        category: row.get("categorie")?,
        page_count: row.get("nombre_pages")?,
        copy_count: row.get("nombre_exemplaires")?,
        created_on: row.get("livre_date_creation")?,
    })
}

/// Insert a book with every attribute. A duplicate ISBN surfaces as a
/// constraint violation; there is no pre-check.
pub fn insert_book(conn: &Connection, book: &Book) -> LibraryResult<()> {
    conn.execute(
        "INSERT INTO livre (isbn, titre, auteur, categorie, nombre_pages, nombre_exemplaires, date_creation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            book.isbn,
            book.title,
            book.author,
            book.category,
            book.page_count,
            book.copy_count,
            book.created_on,
        ],
    )?;
    Ok(())
}

/// Retrieve every book in storage order.
pub fn fetch_books(conn: &Connection) -> LibraryResult<Vec<Book>> {
    let mut stmt = conn.prepare(&format!("SELECT {BOOK_COLUMNS} FROM livre l"))?;

    let books = stmt
        .query_map([], book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(books)
}

/// Look up one book by ISBN. A missing row is `Ok(None)`, not an error.
pub fn fetch_book(conn: &Connection, isbn: i64) -> LibraryResult<Option<Book>> {
    let book = conn
        .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM livre l WHERE l.isbn = ?1"),
            [isbn],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

/// Overwrite the editable fields. Returns whether a row matched.
pub fn update_book(conn: &Connection, isbn: i64, changes: &BookChanges) -> LibraryResult<bool> {
    let updated = conn.execute(
        "UPDATE livre
         SET titre = ?1, auteur = ?2, categorie = ?3, nombre_pages = ?4, date_creation = ?5
         WHERE isbn = ?6",
        params![
            changes.title,
            changes.author,
            changes.category,
            changes.page_count,
            changes.created_on,
            isbn,
        ],
    )?;
    Ok(updated > 0)
}

/// Remove a book row. Copies referencing it are left to the schema's foreign
/// key, which rejects the delete while any remain.
pub fn delete_book(conn: &Connection, isbn: i64) -> LibraryResult<bool> {
    let deleted = conn.execute("DELETE FROM livre WHERE isbn = ?1", [isbn])?;
    Ok(deleted > 0)
}

/// Book operations with one connection per call.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: Database,
}

impl BookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, book: &Book) -> LibraryResult<()> {
        self.db
            .connect()
            .and_then(|conn| insert_book(&conn, book))
            .inspect_err(|err| error!(isbn = book.isbn, error = %err, "failed to add book"))?;

        info!(isbn = book.isbn, title = %book.title, "book added");
        Ok(())
    }

    pub fn delete(&self, isbn: i64) -> LibraryResult<bool> {
        let deleted = self
            .db
            .connect()
            .and_then(|conn| delete_book(&conn, isbn))
            .inspect_err(|err| error!(isbn, error = %err, "failed to delete book"))?;

        if deleted {
            info!(isbn, "book deleted");
        } else {
            warn!(isbn, "no book found with this ISBN");
        }
        Ok(deleted)
    }

    pub fn update(&self, isbn: i64, changes: &BookChanges) -> LibraryResult<bool> {
        let updated = self
            .db
            .connect()
            .and_then(|conn| update_book(&conn, isbn, changes))
            .inspect_err(|err| error!(isbn, error = %err, "failed to update book"))?;

        if updated {
            info!(isbn, "book updated");
        } else {
            warn!(isbn, "no book found with this ISBN");
        }
        Ok(updated)
    }

    pub fn list_all(&self) -> LibraryResult<Vec<Book>> {
        let books = self
            .db
            .connect()
            .and_then(|conn| fetch_books(&conn))
            .inspect_err(|err| error!(error = %err, "failed to list books"))?;

        debug!(count = books.len(), "listed books");
        Ok(books)
    }

    pub fn find_by_isbn(&self, isbn: i64) -> LibraryResult<Option<Book>> {
        let book = self
            .db
            .connect()
            .and_then(|conn| fetch_book(&conn, isbn))
            .inspect_err(|err| error!(isbn, error = %err, "failed to look up book"))?;

        if book.is_none() {
            debug!(isbn, "no book found with this ISBN");
        }
        Ok(book)
    }
}
