//! `SQLite` schema definitions for kinfolk.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the people table.
///
/// Parent links are plain integers with no foreign key constraint.
pub const CREATE_PEOPLE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT,
    last_name TEXT,
    identity_num TEXT,
    phone TEXT,
    birth_date TEXT,
    mother_id INTEGER,
    father_id INTEGER,
    gender TEXT,
    about TEXT,
    photo_path TEXT
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_PEOPLE_TABLE, CREATE_METADATA_TABLE];

/// Column list shared by every query that reads a whole person.
pub const PERSON_COLUMNS: &str = "id, first_name, last_name, identity_num, phone, birth_date, \
     mother_id, father_id, gender, about, photo_path";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_people_table_has_all_columns() {
        for column in PERSON_COLUMNS.split(", ") {
            assert!(
                CREATE_PEOPLE_TABLE.contains(column.trim()),
                "missing column {column}"
            );
        }
    }

    #[test]
    fn test_schema_is_idempotent_sql() {
        for stmt in SCHEMA_STATEMENTS {
            assert!(stmt.contains("IF NOT EXISTS"));
        }
    }
}
