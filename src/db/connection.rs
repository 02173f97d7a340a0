use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::error::{LibraryError, LibraryResult};

use super::{BookRepository, CopyRepository};

/// Schema for both tables. Copy numbers use `AUTOINCREMENT` so a deleted
/// number is never handed out again.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS livre (
        isbn INTEGER PRIMARY KEY,
        titre TEXT NOT NULL,
        auteur TEXT NOT NULL,
        categorie TEXT NOT NULL,
        nombre_pages INTEGER NOT NULL CHECK (nombre_pages >= 0),
        nombre_exemplaires INTEGER NOT NULL CHECK (nombre_exemplaires >= 0),
        date_creation TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS exemplaire (
        numero_exemplaire INTEGER PRIMARY KEY AUTOINCREMENT,
        etat TEXT NOT NULL,
        disponible INTEGER NOT NULL,
        date_creation TEXT NOT NULL,
        isbn INTEGER NOT NULL,
        FOREIGN KEY(isbn) REFERENCES livre(isbn)
    );

    CREATE INDEX IF NOT EXISTS idx_exemplaire_isbn ON exemplaire(isbn);
";

/// Where the library lives and how to reach it. Holds configuration only:
/// every repository call opens its own connection through [`Database::connect`]
/// and drops it before returning.
#[derive(Debug, Clone)]
pub struct Database {
    config: DatabaseConfig,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.clone())
    }

    pub fn copies(&self) -> CopyRepository {
        CopyRepository::new(self.clone())
    }

    /// Open a fresh connection to an existing database file. A missing file
    /// is a connection failure rather than a silently created empty library.
    pub fn connect(&self) -> LibraryResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.config.path, flags)
            .map_err(LibraryError::Connection)?;
        self.configure(&conn)?;
        debug!(path = %self.config.path.display(), "opened database connection");
        Ok(conn)
    }

    /// Create the data directory and database file if needed, then run the
    /// idempotent schema script.
    pub fn ensure_schema(&self) -> LibraryResult<()> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.config.path).map_err(LibraryError::Connection)?;
        self.configure(&conn)?;
        conn.execute_batch(SCHEMA).inspect_err(|err| {
            error!(error = %err, "failed to create library schema");
        })?;

        info!(path = %self.config.path.display(), "library schema ready");
        Ok(())
    }

    /// Open a connection and run a trivial query to prove the backend answers.
    pub fn ping(&self) -> LibraryResult<()> {
        let result = self.connect().and_then(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(LibraryError::Connection)
        });

        match result {
            Ok(_) => {
                info!(path = %self.config.path.display(), "connected to database");
                Ok(())
            }
            Err(err) => {
                error!(path = %self.config.path.display(), error = %err, "database connection failed");
                Err(err)
            }
        }
    }

    fn configure(&self, conn: &Connection) -> LibraryResult<()> {
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(LibraryError::Connection)?;
        let pragma = if self.config.foreign_keys {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        conn.execute_batch(pragma).map_err(LibraryError::Connection)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn database_in(dir: &TempDir) -> Database {
        Database::new(DatabaseConfig::new(dir.path().join("nested").join("library.sqlite")))
    }

    #[test]
    fn ensure_schema_creates_file_and_tables() {
        let dir = TempDir::new().unwrap();
        let db = database_in(&dir);

        db.ensure_schema().unwrap();
        assert!(db.path().exists());

        let conn = db.connect().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('livre', 'exemplaire') ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["exemplaire".to_string(), "livre".to_string()]);
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = database_in(&dir);

        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();
        db.ping().unwrap();
    }

    #[test]
    fn connect_to_missing_file_is_a_connection_failure() {
        let dir = TempDir::new().unwrap();
        let db = database_in(&dir);

        let err = db.connect().unwrap_err();
        assert!(err.is_connection_failure());
        assert!(db.ping().unwrap_err().is_connection_failure());
    }

    #[test]
    fn foreign_keys_follow_config() {
        let dir = TempDir::new().unwrap();
        let mut config = DatabaseConfig::new(dir.path().join("library.sqlite"));
        config.foreign_keys = false;
        let db = Database::new(config);
        db.ensure_schema().unwrap();

        let conn = db.connect().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 0);
    }
}
