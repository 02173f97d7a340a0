use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, error, info, warn};

use crate::error::LibraryResult;
use crate::models::{BookCopy, CopyChanges, CopySummary};

use super::books::{book_from_row, BOOK_COLUMNS};
use super::Database;

const COPY_COLUMNS: &str = "e.numero_exemplaire, e.etat, e.disponible, \
     e.date_creation AS exemplaire_date_creation";

/// Copies joined with their owning book, resolved in a single query.
fn joined_query(filter: &str) -> String {
    format!(
        "SELECT {COPY_COLUMNS}, {BOOK_COLUMNS}
         FROM exemplaire e
         INNER JOIN livre l ON e.isbn = l.isbn
         {filter}
         ORDER BY e.numero_exemplaire"
    )
}

fn copy_from_row(row: &Row<'_>) -> rusqlite::Result<BookCopy> {
    Ok(BookCopy {
        id: Some(row.get("numero_exemplaire")?),
        condition: row.get("etat")?,
        available: row.get("disponible")?,
        created_on: row.get("exemplaire_date_creation")?,
        book: book_from_row(row)?,
    })
}

/// Insert a copy and back-fill the generated number into `copy.id`. Only the
/// owning book's ISBN is written; the rest of `copy.book` is ignored. When no
/// key comes back the record is left without an id and `None` is returned.
pub fn insert_copy(conn: &Connection, copy: &mut BookCopy) -> LibraryResult<Option<i64>> {
    let inserted = conn.execute(
        "INSERT INTO exemplaire (etat, disponible, date_creation, isbn) VALUES (?1, ?2, ?3, ?4)",
        params![copy.condition, copy.available, copy.created_on, copy.book.isbn],
    )?;

    if inserted > 0 {
        let id = conn.last_insert_rowid();
        if id > 0 {
            copy.id = Some(id);
        }
    }
    Ok(copy.id)
}

/// Every copy with its book, ordered by copy number.
pub fn fetch_copies(conn: &Connection) -> LibraryResult<Vec<BookCopy>> {
    let mut stmt = conn.prepare(&joined_query(""))?;

    let copies = stmt
        .query_map([], copy_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(copies)
}

/// Look up one copy by number, joined with its owning book. A missing row is
/// `Ok(None)`.
pub fn fetch_copy(conn: &Connection, id: i64) -> LibraryResult<Option<BookCopy>> {
    let copy = conn
        .query_row(
            &joined_query("WHERE e.numero_exemplaire = ?1"),
            [id],
            copy_from_row,
        )
        .optional()?;
    Ok(copy)
}

/// Copies of one book that can currently be lent. An unknown ISBN simply
/// yields an empty list.
pub fn fetch_available_copies(conn: &Connection, isbn: i64) -> LibraryResult<Vec<BookCopy>> {
    let mut stmt = conn.prepare(&joined_query("WHERE e.isbn = ?1 AND e.disponible = 1"))?;

    let copies = stmt
        .query_map([isbn], copy_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(copies)
}

/// Number, condition, availability and book title for every copy.
pub fn fetch_copy_summaries(conn: &Connection) -> LibraryResult<Vec<CopySummary>> {
    let mut stmt = conn.prepare(
        "SELECT e.numero_exemplaire, e.etat, e.disponible, l.titre
         FROM exemplaire e
         INNER JOIN livre l ON e.isbn = l.isbn
         ORDER BY e.numero_exemplaire",
    )?;

    let summaries = stmt
        .query_map([], |row| {
            Ok(CopySummary {
                id: row.get(0)?,
                condition: row.get(1)?,
                available: row.get(2)?,
                title: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summaries)
}

/// Overwrite condition and availability. Creation date and owning book are
/// never touched here.
pub fn update_copy(conn: &Connection, id: i64, changes: &CopyChanges) -> LibraryResult<bool> {
    let updated = conn.execute(
        "UPDATE exemplaire SET etat = ?1, disponible = ?2 WHERE numero_exemplaire = ?3",
        params![changes.condition, changes.available, id],
    )?;
    Ok(updated > 0)
}

/// Remove a copy by number. Returns whether a row was deleted; a missing
/// copy is reported as `false`, not as an error.
pub fn delete_copy(conn: &Connection, id: i64) -> LibraryResult<bool> {
    let deleted = conn.execute("DELETE FROM exemplaire WHERE numero_exemplaire = ?1", [id])?;
    Ok(deleted > 0)
}

/// Copy operations with one connection per call.
#[derive(Debug, Clone)]
pub struct CopyRepository {
    db: Database,
}

impl CopyRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert `copy` and assign its generated number. Callers must check the
    /// returned id (or `copy.id`) before relying on it.
    pub fn create(&self, copy: &mut BookCopy) -> LibraryResult<Option<i64>> {
        let isbn = copy.book.isbn;
        let id = self
            .db
            .connect()
            .and_then(|conn| insert_copy(&conn, copy))
            .inspect_err(|err| error!(isbn, error = %err, "failed to add copy"))?;

        match id {
            Some(id) => info!(id, isbn, "copy added"),
            None => warn!(isbn, "copy inserted but no generated number was returned"),
        }
        Ok(id)
    }

    pub fn delete(&self, id: i64) -> LibraryResult<bool> {
        let deleted = self
            .db
            .connect()
            .and_then(|conn| delete_copy(&conn, id))
            .inspect_err(|err| error!(id, error = %err, "failed to delete copy"))?;

        if deleted {
            info!(id, "copy deleted");
        } else {
            warn!(id, "no copy found with this number");
        }
        Ok(deleted)
    }

    pub fn update(&self, id: i64, changes: &CopyChanges) -> LibraryResult<bool> {
        let updated = self
            .db
            .connect()
            .and_then(|conn| update_copy(&conn, id, changes))
            .inspect_err(|err| error!(id, error = %err, "failed to update copy"))?;

        if updated {
            info!(id, condition = %changes.condition, available = changes.available, "copy updated");
        } else {
            warn!(id, "no copy found with this number");
        }
        Ok(updated)
    }

    pub fn list_all(&self) -> LibraryResult<Vec<BookCopy>> {
        let copies = self
            .db
            .connect()
            .and_then(|conn| fetch_copies(&conn))
            .inspect_err(|err| error!(error = %err, "failed to list copies"))?;

        debug!(count = copies.len(), "listed copies");
        Ok(copies)
    }

    pub fn find_by_id(&self, id: i64) -> LibraryResult<Option<BookCopy>> {
        let copy = self
            .db
            .connect()
            .and_then(|conn| fetch_copy(&conn, id))
            .inspect_err(|err| error!(id, error = %err, "failed to look up copy"))?;

        if copy.is_none() {
            debug!(id, "no copy found with this number");
        }
        Ok(copy)
    }

    pub fn list_available_for_book(&self, isbn: i64) -> LibraryResult<Vec<BookCopy>> {
        let copies = self
            .db
            .connect()
            .and_then(|conn| fetch_available_copies(&conn, isbn))
            .inspect_err(|err| error!(isbn, error = %err, "failed to list available copies"))?;

        debug!(isbn, count = copies.len(), "listed available copies");
        Ok(copies)
    }

    pub fn list_summaries(&self) -> LibraryResult<Vec<CopySummary>> {
        self.db
            .connect()
            .and_then(|conn| fetch_copy_summaries(&conn))
            .inspect_err(|err| error!(error = %err, "failed to list copy summaries"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{book, date, temp_database};
    use crate::models::{Book, Condition};

    fn seeded() -> (tempfile::TempDir, Database, Book) {
        let (dir, db) = temp_database();
        let owner = book(111, "Dune", "Herbert");
        db.books().create(&owner).unwrap();
        (dir, db, owner)
    }

    #[test]
    fn create_back_fills_generated_number() {
        let (_dir, db, owner) = seeded();
        let mut copy = BookCopy::new(Condition::New, true, date(2024, 1, 2), owner);

        let id = db.copies().create(&mut copy).unwrap();

        assert!(id.is_some_and(|id| id > 0));
        assert_eq!(copy.id, id);
    }

    #[test]
    fn find_by_id_joins_owning_book() {
        let (_dir, db, owner) = seeded();
        let copies = db.copies();
        let mut copy = BookCopy::new(Condition::Poor, false, date(2024, 3, 4), owner.clone());
        let id = copies.create(&mut copy).unwrap().unwrap();

        let found = copies.find_by_id(id).unwrap().unwrap();

        assert_eq!(found, copy);
        assert_eq!(found.book, owner);
        assert_eq!(found.created_on, date(2024, 3, 4));
        assert_eq!(found.book.created_on, date(2024, 1, 1));
    }

    #[test]
    fn numbers_are_unique_and_never_reused() {
        let (_dir, db, owner) = seeded();
        let copies = db.copies();
        let mut first = BookCopy::new(Condition::Good, true, date(2024, 1, 2), owner.clone());
        let mut second = first.clone();
        let first_id = copies.create(&mut first).unwrap().unwrap();
        let second_id = copies.create(&mut second).unwrap().unwrap();
        assert_ne!(first_id, second_id);

        assert!(copies.delete(second_id).unwrap());
        let mut third = BookCopy::new(Condition::Good, true, date(2024, 1, 2), owner);
        let third_id = copies.create(&mut third).unwrap().unwrap();

        assert!(third_id > second_id);
    }

    #[test]
    fn copy_for_missing_book_is_rejected() {
        let (_dir, db, _owner) = seeded();
        let mut orphan = BookCopy::new(Condition::New, true, date(2024, 1, 2), book(999, "?", "?"));

        let err = db.copies().create(&mut orphan).unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(orphan.id, None);
    }

    #[test]
    fn update_only_touches_condition_and_availability() {
        let (_dir, db, owner) = seeded();
        let copies = db.copies();
        let mut copy = BookCopy::new(Condition::New, true, date(2024, 1, 2), owner.clone());
        let id = copies.create(&mut copy).unwrap().unwrap();

        let changes = CopyChanges {
            condition: Condition::Average,
            available: false,
        };
        assert!(copies.update(id, &changes).unwrap());

        let updated = copies.find_by_id(id).unwrap().unwrap();
        assert_eq!(updated.condition, Condition::Average);
        assert!(!updated.available);
        assert_eq!(updated.created_on, date(2024, 1, 2));
        assert_eq!(updated.book.isbn, owner.isbn);
    }

    #[test]
    fn missing_copy_reports_no_row() {
        let (_dir, db, _owner) = seeded();
        let copies = db.copies();
        let changes = CopyChanges {
            condition: Condition::New,
            available: true,
        };

        assert!(!copies.update(12345, &changes).unwrap());
        assert!(!copies.delete(12345).unwrap());
        assert_eq!(copies.find_by_id(12345).unwrap(), None);
    }

    #[test]
    fn available_for_book_filters_by_book_and_flag() {
        let (_dir, db, owner) = seeded();
        let other = book(222, "Hyperion", "Simmons");
        db.books().create(&other).unwrap();
        let copies = db.copies();

        let mut on_shelf = BookCopy::new(Condition::New, true, date(2024, 1, 2), owner.clone());
        let mut lent = BookCopy::new(Condition::Good, false, date(2024, 1, 3), owner.clone());
        let mut elsewhere = BookCopy::new(Condition::Good, true, date(2024, 1, 4), other);
        let on_shelf_id = copies.create(&mut on_shelf).unwrap();
        copies.create(&mut lent).unwrap();
        copies.create(&mut elsewhere).unwrap();

        let available = copies.list_available_for_book(owner.isbn).unwrap();

        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, on_shelf_id);
        assert!(copies.list_available_for_book(404).unwrap().is_empty());
    }

    #[test]
    fn list_all_and_summaries_cover_every_copy() {
        let (_dir, db, owner) = seeded();
        let copies = db.copies();
        let mut a = BookCopy::new(Condition::New, true, date(2024, 1, 2), owner.clone());
        let mut b = BookCopy::new(Condition::parse("abîmé"), false, date(2024, 1, 3), owner);
        copies.create(&mut a).unwrap();
        copies.create(&mut b).unwrap();

        let all = copies.list_all().unwrap();
        assert_eq!(all, vec![a, b.clone()]);

        let summaries = copies.list_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].id, b.id.unwrap());
        assert_eq!(summaries[1].condition, Condition::Unknown("abîmé".to_string()));
        assert_eq!(summaries[1].title, "Dune");
        assert_eq!(summaries[1].availability_label(), "Non");
    }

    #[test]
    fn book_with_copies_cannot_be_deleted() {
        let (_dir, db, owner) = seeded();
        let mut copy = BookCopy::new(Condition::New, true, date(2024, 1, 2), owner.clone());
        db.copies().create(&mut copy).unwrap();

        let err = db.books().delete(owner.isbn).unwrap_err();

        assert!(err.is_constraint_violation());
    }
}
