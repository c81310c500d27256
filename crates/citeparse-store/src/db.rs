//! SQLite operations for the reference store.

use citeparse_core::{ParsedReference, PublicationType};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{Project, StoreError, StoredReference};

/// Initialize the database with the required schema.
/// Sets WAL mode and NORMAL synchronous, and turns on foreign keys.
pub fn init_database(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS refs (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            authors TEXT NOT NULL,
            year TEXT,
            title TEXT,
            journal TEXT,
            book_title TEXT,
            volume TEXT,
            issue TEXT,
            pages TEXT,
            doi TEXT,
            editor TEXT,
            institution TEXT,
            publication_type TEXT NOT NULL,
            original_string TEXT NOT NULL,
            matched_pattern TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_refs_project ON refs(project_id);
        "#,
    )?;

    Ok(())
}

const REF_COLUMNS: &str = "id, project_id, authors, year, title, journal, book_title, volume, \
                           issue, pages, doi, editor, institution, publication_type, \
                           original_string, matched_pattern";

pub fn insert_project(conn: &Connection, name: &str) -> Result<Project, StoreError> {
    conn.execute("INSERT INTO projects (name) VALUES (?1)", params![name])?;
    Ok(Project {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn select_projects(conn: &Connection) -> Result<Vec<Project>, StoreError> {
    let mut stmt = conn.prepare_cached("SELECT id, name FROM projects ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn select_project(conn: &Connection, id: i64) -> Result<Option<Project>, StoreError> {
    let project = conn
        .query_row(
            "SELECT id, name FROM projects WHERE id = ?1",
            params![id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(project)
}

pub fn select_project_by_name(conn: &Connection, name: &str) -> Result<Option<Project>, StoreError> {
    let project = conn
        .query_row(
            "SELECT id, name FROM projects WHERE name = ?1",
            params![name],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(project)
}

pub fn insert_reference(
    conn: &Connection,
    project_id: i64,
    reference: &ParsedReference,
) -> Result<i64, StoreError> {
    let authors = serde_json::to_string(&reference.authors)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO refs (project_id, authors, year, title, journal, book_title, volume, \
         issue, pages, doi, editor, institution, publication_type, original_string, \
         matched_pattern) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )?;
    stmt.execute(params![
        project_id,
        authors,
        reference.year,
        reference.title,
        reference.journal,
        reference.book_title,
        reference.volume,
        reference.issue,
        reference.pages,
        reference.doi,
        reference.editor,
        reference.institution,
        reference.publication_type.as_str(),
        reference.original_string,
        reference.matched_pattern,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite every field of a stored reference. Returns rows changed.
pub fn update_reference(
    conn: &Connection,
    id: i64,
    reference: &ParsedReference,
) -> Result<usize, StoreError> {
    let authors = serde_json::to_string(&reference.authors)?;
    let changed = conn.execute(
        "UPDATE refs SET authors = ?2, year = ?3, title = ?4, journal = ?5, book_title = ?6, \
         volume = ?7, issue = ?8, pages = ?9, doi = ?10, editor = ?11, institution = ?12, \
         publication_type = ?13, original_string = ?14, matched_pattern = ?15 \
         WHERE id = ?1",
        params![
            id,
            authors,
            reference.year,
            reference.title,
            reference.journal,
            reference.book_title,
            reference.volume,
            reference.issue,
            reference.pages,
            reference.doi,
            reference.editor,
            reference.institution,
            reference.publication_type.as_str(),
            reference.original_string,
            reference.matched_pattern,
        ],
    )?;
    Ok(changed)
}

/// Returns rows deleted.
pub fn delete_reference(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM refs WHERE id = ?1", params![id])?)
}

pub fn select_reference(conn: &Connection, id: i64) -> Result<Option<StoredReference>, StoreError> {
    let sql = format!("SELECT {REF_COLUMNS} FROM refs WHERE id = ?1");
    let stored = conn.query_row(&sql, params![id], row_to_reference).optional()?;
    Ok(stored)
}

/// All references of a project, ordered by authors then year.
pub fn select_references(
    conn: &Connection,
    project_id: i64,
) -> Result<Vec<StoredReference>, StoreError> {
    let sql = format!(
        "SELECT {REF_COLUMNS} FROM refs WHERE project_id = ?1 \
         ORDER BY authors COLLATE NOCASE, year, id"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![project_id], row_to_reference)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn row_to_reference(row: &Row<'_>) -> rusqlite::Result<StoredReference> {
    let authors_json: String = row.get(2)?;
    let authors: Vec<String> = serde_json::from_str(&authors_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let publication_type: String = row.get(13)?;

    Ok(StoredReference {
        id: row.get(0)?,
        project_id: row.get(1)?,
        reference: ParsedReference {
            authors,
            year: row.get(3)?,
            title: row.get(4)?,
            journal: row.get(5)?,
            book_title: row.get(6)?,
            volume: row.get(7)?,
            issue: row.get(8)?,
            pages: row.get(9)?,
            doi: row.get(10)?,
            editor: row.get(11)?,
            institution: row.get(12)?,
            publication_type: publication_type
                .parse::<PublicationType>()
                .unwrap_or_default(),
            original_string: row.get(14)?,
            matched_pattern: row.get(15)?,
        },
    })
}
