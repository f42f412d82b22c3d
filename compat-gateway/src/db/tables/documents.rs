//! Document store operations: get, add, merge-set, list and equality query.
//!
//! Listing order is ascending document id.

use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};
use serde_json::Value;

use crate::db::Database;
use crate::models::{Attributes, CollectionPath, Document, DocumentPath};

const ID_LENGTH: usize = 20;

/// Value stored for server-stamped fields such as `createdAt`
pub fn server_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// SQLite `LIMIT` value; `-1` means unbounded. Saturates instead of wrapping
/// into a negative (unbounded) limit.
fn sql_limit(limit: Option<usize>) -> i64 {
    match limit {
        Some(l) => i64::try_from(l).unwrap_or(i64::MAX),
        None => -1,
    }
}

fn parse_attributes(idx: usize, raw: &str) -> SqliteResult<Attributes> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_document(row: &Row<'_>) -> SqliteResult<Document> {
    let id: String = row.get(0)?;
    let raw: String = row.get(1)?;
    Ok(Document {
        id,
        data: parse_attributes(1, &raw)?,
    })
}

fn to_json(data: &Attributes) -> SqliteResult<String> {
    serde_json::to_string(data).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Merge `patch` into `target`. Nested objects merge field by field, every
/// other value replaces what was there.
fn deep_merge(target: &mut Attributes, patch: &Attributes) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

impl Database {
    /// Get a single document, `None` if it does not exist
    pub fn get_document(&self, path: &DocumentPath) -> SqliteResult<Option<Document>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT doc_id, data FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![path.parent().as_str(), path.id()],
            row_to_document,
        )
        .optional()
    }

    /// Add a document with a generated id
    pub fn add_document(&self, collection: &CollectionPath, data: &Attributes) -> SqliteResult<Document> {
        let conn = self.lock();
        let id = generate_id();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection.as_str(), id, to_json(data)?, now],
        )?;

        log::debug!("Added document {}/{}", collection, id);

        Ok(Document {
            id,
            data: data.clone(),
        })
    }

    /// Merge-set: fields in `data` overwrite, everything else is kept.
    /// Creates the document if it does not exist.
    pub fn merge_document(&self, path: &DocumentPath, data: &Attributes) -> SqliteResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let existing: Option<String> = tx
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![path.parent().as_str(), path.id()],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(raw) => {
                let mut merged = parse_attributes(0, &raw)?;
                deep_merge(&mut merged, data);
                tx.execute(
                    "UPDATE documents SET data = ?1, updated_at = ?2 WHERE collection = ?3 AND doc_id = ?4",
                    params![to_json(&merged)?, now, path.parent().as_str(), path.id()],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![path.parent().as_str(), path.id(), to_json(data)?, now],
                )?;
            }
        }

        tx.commit()
    }

    /// List documents in a collection, optionally bounded
    pub fn list_documents(&self, collection: &CollectionPath, limit: Option<usize>) -> SqliteResult<Vec<Document>> {
        let conn = self.lock();

        let mut stmt = conn.prepare(
            "SELECT doc_id, data FROM documents WHERE collection = ?1 ORDER BY doc_id LIMIT ?2",
        )?;

        let docs = stmt
            .query_map(params![collection.as_str(), sql_limit(limit)], row_to_document)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(docs)
    }

    /// Documents whose top-level `field` equals `value`
    pub fn find_documents(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> SqliteResult<Vec<Document>> {
        let conn = self.lock();
        let json_path = format!("$.\"{}\"", field);
        let needle = value.to_string();

        let mut stmt = conn.prepare(
            "SELECT doc_id, data FROM documents
             WHERE collection = ?1 AND json_extract(data, ?2) = json_extract(?3, '$')
             ORDER BY doc_id LIMIT ?4",
        )?;

        let docs = stmt
            .query_map(
                params![collection.as_str(), json_path, needle, sql_limit(Some(limit))],
                row_to_document,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(docs)
    }

    /// Number of documents directly in a collection
    pub fn count_documents(&self, collection: &CollectionPath) -> SqliteResult<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
