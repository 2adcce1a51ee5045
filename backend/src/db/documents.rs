//! Document metadata queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, Database, DbError};
use crate::models::Document;

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        title: row.get(1)?,
        filename: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get::<_, i64>(4)? as u64,
        mime_type: row.get(5)?,
        uploaded_by: row.get(6)?,
        uploaded_by_id: row.get(7)?,
        created_at: parse_ts(&row.get::<_, String>(8)?),
    })
}

const DOCUMENT_COLUMNS: &str =
    "id, title, filename, file_path, file_size, mime_type, uploaded_by, uploaded_by_id, created_at";

impl Database {
    pub fn insert_document(&self, document: &Document) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (id, title, filename, file_path, file_size, mime_type,
                                    uploaded_by, uploaded_by_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                document.id,
                document.title,
                document.filename,
                document.file_path,
                document.file_size as i64,
                document.mime_type,
                document.uploaded_by,
                document.uploaded_by_id,
                document.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_documents(&self) -> Result<Vec<Document>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at DESC"
        ))?;
        let documents = stmt
            .query_map([], document_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(documents)
    }

    pub fn find_document(&self, id: &str) -> Result<Option<Document>, DbError> {
        let conn = self.conn()?;
        let document = conn
            .query_row(
                &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
                params![id],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    pub fn delete_document(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
