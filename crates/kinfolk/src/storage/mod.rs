//! Storage layer for kinfolk.
//!
//! This module provides the [`PersonStore`] contract the web layer is written
//! against, and [`Storage`], its `SQLite` implementation.

pub mod migrations;
pub mod schema;
pub mod search;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::person::{Gender, Person};

use self::schema::PERSON_COLUMNS;
pub use self::search::Page;

/// Persistence operations for person records.
///
/// Each call issues a single statement; nothing spans calls.
pub trait PersonStore: Send + Sync + std::fmt::Debug {
    /// Insert a new person and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn create(&self, person: &Person) -> Result<i64>;

    /// Fetch a person by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no row matches.
    fn get_by_id(&self, id: i64) -> Result<Person>;

    /// Overwrite the editable fields of an existing person.
    ///
    /// Parent links are left as stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the person has no id or no row matches.
    fn update(&self, person: &Person) -> Result<()>;

    /// Find people whose first or last name contains `term`.
    ///
    /// An empty term matches everyone. Results are ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn search(&self, term: &str, page: u32, limit: u32) -> Result<Vec<Person>>;

    /// Count stored people.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count(&self) -> Result<i64>;
}

/// `SQLite`-backed person store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, locked per statement.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    /// Convert a database row to a Person struct.
    fn row_to_person(row: &rusqlite::Row) -> rusqlite::Result<Person> {
        let gender_code: Option<String> = row.get(8)?;
        let gender = gender_code
            .unwrap_or_default()
            .parse::<Gender>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

        Ok(Person {
            id: Some(row.get(0)?),
            first_name: text(row, 1)?,
            last_name: text(row, 2)?,
            identity_num: text(row, 3)?,
            phone: text(row, 4)?,
            birth_date: text(row, 5)?,
            mother_id: row.get(6)?,
            father_id: row.get(7)?,
            gender,
            about: text(row, 9)?,
            photo_path: text(row, 10)?,
        })
    }
}

/// Read a nullable text column, mapping NULL to an empty string.
fn text(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

impl PersonStore for Storage {
    fn create(&self, person: &Person) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r"
            INSERT INTO people (first_name, last_name, identity_num, phone, birth_date,
                mother_id, father_id, gender, about, photo_path)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                person.first_name,
                person.last_name,
                person.identity_num,
                person.phone,
                person.birth_date,
                person.mother_id,
                person.father_id,
                person.gender.code(),
                person.about,
                person.photo_path,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted person with id {}", id);
        Ok(id)
    }

    fn get_by_id(&self, id: i64) -> Result<Person> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1");
        self.conn()?
            .query_row(&sql, [id], Self::row_to_person)
            .optional()?
            .ok_or(Error::NotFound { id })
    }

    fn update(&self, person: &Person) -> Result<()> {
        let Some(id) = person.id else {
            return Err(Error::NotFound { id: 0 });
        };

        let affected = self.conn()?.execute(
            r"
            UPDATE people
            SET first_name = ?1, last_name = ?2, identity_num = ?3,
                phone = ?4, birth_date = ?5, gender = ?6,
                about = ?7, photo_path = ?8
            WHERE id = ?9
            ",
            params![
                person.first_name,
                person.last_name,
                person.identity_num,
                person.phone,
                person.birth_date,
                person.gender.code(),
                person.about,
                person.photo_path,
                id,
            ],
        )?;

        if affected == 0 {
            return Err(Error::NotFound { id });
        }
        debug!("Updated person with id {}", id);
        Ok(())
    }

    fn search(&self, term: &str, page: u32, limit: u32) -> Result<Vec<Person>> {
        let page = Page::new(page, limit);
        let pattern = search::contains_pattern(term);
        let sql = format!(
            r"
            SELECT {PERSON_COLUMNS}
            FROM people
            WHERE first_name LIKE ?1 ESCAPE '\' OR last_name LIKE ?1 ESCAPE '\'
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let people = stmt
            .query_map(
                params![pattern, page.limit(), page.offset()],
                Self::row_to_person,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Search for {:?} (page {}) matched {} people",
            term,
            page.number,
            people.len()
        );
        Ok(people)
    }

    fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;
        Ok(count)
    }
}
