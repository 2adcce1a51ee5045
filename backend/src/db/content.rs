//! Content block queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, Database, DbError};
use crate::models::ContentBlock;

fn block_from_row(row: &Row<'_>) -> rusqlite::Result<ContentBlock> {
    Ok(ContentBlock {
        key: row.get(0)?,
        value: row.get(1)?,
        updated_at: parse_ts(&row.get::<_, String>(2)?),
        updated_by: row.get(3)?,
        updated_by_id: row.get(4)?,
    })
}

const BLOCK_COLUMNS: &str = "key, value, updated_at, updated_by, updated_by_id";

impl Database {
    /// Insert or replace the block stored under its key.
    pub fn upsert_content_block(&self, block: &ContentBlock) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO content_blocks (key, value, updated_at, updated_by, updated_by_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at,
                 updated_by = excluded.updated_by,
                 updated_by_id = excluded.updated_by_id",
            params![
                block.key,
                block.value,
                block.updated_at.to_rfc3339(),
                block.updated_by,
                block.updated_by_id,
            ],
        )?;
        Ok(())
    }

    pub fn find_content_block(&self, key: &str) -> Result<Option<ContentBlock>, DbError> {
        let conn = self.conn()?;
        let block = conn
            .query_row(
                &format!("SELECT {BLOCK_COLUMNS} FROM content_blocks WHERE key = ?1"),
                params![key],
                block_from_row,
            )
            .optional()?;
        Ok(block)
    }

    pub fn list_content_blocks(&self) -> Result<Vec<ContentBlock>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_blocks ORDER BY key ASC"
        ))?;
        let blocks = stmt
            .query_map([], block_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(blocks)
    }
}
