//! Persistent storage for parsed references.
//!
//! References are grouped under named projects and kept in a single SQLite
//! file. [`ReferenceStore`] is the narrow interface the rest of the system
//! depends on; [`ReferenceDb`] is the SQLite implementation and
//! [`MemoryStore`] an in-process stand-in.

use std::path::Path;
use std::sync::Mutex;

use citeparse_core::ParsedReference;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

pub mod db;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("project '{0}' not found")]
    UnknownProject(String),
    #[error("failed to encode authors: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// A reference as stored, with its row id and owning project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReference {
    pub id: i64,
    pub project_id: i64,
    #[serde(flatten)]
    pub reference: ParsedReference,
}

/// Anything that can persist a parsed reference under a project.
pub trait ReferenceStore {
    /// Save `reference` under `project_id` and return its new id.
    fn save_reference(&self, project_id: i64, reference: &ParsedReference)
        -> Result<i64, StoreError>;
}

/// SQLite-backed reference store.
pub struct ReferenceDb {
    conn: Connection,
}

impl ReferenceDb {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        db::init_database(&conn)?;
        tracing::info!(path = %path.display(), "opened reference store");
        Ok(Self { conn })
    }

    /// A throwaway database living only as long as the handle.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        db::init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        db::insert_project(&self.conn, name)
    }

    /// Look a project up by name, creating it if it does not exist yet.
    pub fn ensure_project(&self, name: &str) -> Result<Project, StoreError> {
        match db::select_project_by_name(&self.conn, name)? {
            Some(project) => Ok(project),
            None => self.create_project(name),
        }
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        db::select_projects(&self.conn)
    }

    pub fn project(&self, id: i64) -> Result<Project, StoreError> {
        db::select_project(&self.conn, id)?.ok_or(StoreError::NotFound { kind: "project", id })
    }

    pub fn project_by_name(&self, name: &str) -> Result<Project, StoreError> {
        db::select_project_by_name(&self.conn, name)?
            .ok_or_else(|| StoreError::UnknownProject(name.to_string()))
    }

    /// Save every reference in one transaction. Returns the new ids in order.
    pub fn save_references(
        &self,
        project_id: i64,
        references: &[ParsedReference],
    ) -> Result<Vec<i64>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let ids = references
            .iter()
            .map(|r| db::insert_reference(&tx, project_id, r))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;
        tracing::debug!(project_id, count = ids.len(), "saved references");
        Ok(ids)
    }

    pub fn reference(&self, id: i64) -> Result<StoredReference, StoreError> {
        db::select_reference(&self.conn, id)?.ok_or(StoreError::NotFound {
            kind: "reference",
            id,
        })
    }

    pub fn update_reference(&self, id: i64, reference: &ParsedReference) -> Result<(), StoreError> {
        match db::update_reference(&self.conn, id, reference)? {
            0 => Err(StoreError::NotFound {
                kind: "reference",
                id,
            }),
            _ => Ok(()),
        }
    }

    pub fn delete_reference(&self, id: i64) -> Result<(), StoreError> {
        match db::delete_reference(&self.conn, id)? {
            0 => Err(StoreError::NotFound {
                kind: "reference",
                id,
            }),
            _ => Ok(()),
        }
    }

    /// References of a project, ordered by authors then year.
    pub fn list_references(&self, project_id: i64) -> Result<Vec<StoredReference>, StoreError> {
        db::select_references(&self.conn, project_id)
    }
}

impl ReferenceStore for ReferenceDb {
    fn save_reference(
        &self,
        project_id: i64,
        reference: &ParsedReference,
    ) -> Result<i64, StoreError> {
        db::insert_reference(&self.conn, project_id, reference)
    }
}

/// In-memory [`ReferenceStore`] for callers that do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<StoredReference>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far, in save order.
    pub fn saved(&self) -> Vec<StoredReference> {
        match self.saved.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ReferenceStore for MemoryStore {
    fn save_reference(
        &self,
        project_id: i64,
        reference: &ParsedReference,
    ) -> Result<i64, StoreError> {
        let mut saved = self.saved.lock().unwrap_or_else(|p| p.into_inner());
        let id = saved.len() as i64 + 1;
        saved.push(StoredReference {
            id,
            project_id,
            reference: reference.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(authors: &[&str], year: &str) -> ParsedReference {
        ParsedReference {
            authors: authors.iter().map(|a| a.to_string()).collect(),
            year: Some(year.to_string()),
            title: Some("A title".into()),
            ..ParsedReference::blank("raw line")
        }
    }

    #[test]
    fn memory_store_assigns_sequential_ids() {
        let store = MemoryStore::new();
        assert_eq!(store.save_reference(7, &sample(&["Smith, J."], "2001")).unwrap(), 1);
        assert_eq!(store.save_reference(7, &sample(&["Doe, A."], "2002")).unwrap(), 2);
        let saved = store.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].project_id, 7);
    }

    #[test]
    fn in_memory_db_round_trip() {
        let db = ReferenceDb::open_in_memory().unwrap();
        let project = db.create_project("thesis").unwrap();
        let id = db.save_reference(project.id, &sample(&["Smith, J."], "2001")).unwrap();
        let stored = db.reference(id).unwrap();
        assert_eq!(stored.project_id, project.id);
        assert_eq!(stored.reference.authors, vec!["Smith, J."]);
    }

    #[test]
    fn missing_reference_is_not_found() {
        let db = ReferenceDb::open_in_memory().unwrap();
        assert!(matches!(
            db.reference(42),
            Err(StoreError::NotFound { kind: "reference", id: 42 })
        ));
        assert!(matches!(db.delete_reference(42), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn stored_reference_serializes_flat() {
        let stored = StoredReference {
            id: 3,
            project_id: 1,
            reference: sample(&["Smith, J."], "2001"),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["projectId"], 1);
        assert_eq!(value["year"], "2001");
        assert_eq!(value["originalString"], "raw line");
    }
}
