//! Gallery image queries, including the per-uploader daily counter.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, Database, DbError};
use crate::models::{GalleryCategory, GalleryImage};

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<GalleryImage> {
    let category: String = row.get(3)?;
    Ok(GalleryImage {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: GalleryCategory::parse(&category).unwrap_or(GalleryCategory::Other),
        filename: row.get(4)?,
        file_path: row.get(5)?,
        file_size: row.get::<_, i64>(6)? as u64,
        uploaded_by: row.get(7)?,
        uploaded_by_id: row.get(8)?,
        created_at: parse_ts(&row.get::<_, String>(9)?),
    })
}

const IMAGE_COLUMNS: &str = "id, title, description, category, filename, file_path, file_size, \
                             uploaded_by, uploaded_by_id, created_at";

impl Database {
    pub fn insert_gallery_image(&self, image: &GalleryImage) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO gallery_images (id, title, description, category, filename, file_path,
                                         file_size, uploaded_by, uploaded_by_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                image.id,
                image.title,
                image.description,
                image.category.as_str(),
                image.filename,
                image.file_path,
                image.file_size as i64,
                image.uploaded_by,
                image.uploaded_by_id,
                image.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// One page of images, newest first, optionally filtered by category.
    pub fn list_gallery_images(
        &self,
        category: Option<GalleryCategory>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GalleryImage>, DbError> {
        let conn = self.conn()?;
        let images = match category {
            Some(category) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {IMAGE_COLUMNS} FROM gallery_images WHERE category = ?1
                     ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                ))?;
                let rows = stmt
                    .query_map(params![category.as_str(), limit, offset], image_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {IMAGE_COLUMNS} FROM gallery_images
                     ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
                ))?;
                let rows = stmt
                    .query_map(params![limit, offset], image_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(images)
    }

    pub fn count_gallery_images(
        &self,
        category: Option<GalleryCategory>,
    ) -> Result<u32, DbError> {
        let conn = self.conn()?;
        let count: u32 = match category {
            Some(category) => conn.query_row(
                "SELECT COUNT(*) FROM gallery_images WHERE category = ?1",
                params![category.as_str()],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM gallery_images", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn latest_gallery_images(&self, limit: u32) -> Result<Vec<GalleryImage>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IMAGE_COLUMNS} FROM gallery_images ORDER BY created_at DESC LIMIT ?1"
        ))?;
        let images = stmt
            .query_map(params![limit], image_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(images)
    }

    pub fn find_gallery_image(&self, id: &str) -> Result<Option<GalleryImage>, DbError> {
        let conn = self.conn()?;
        let image = conn
            .query_row(
                &format!("SELECT {IMAGE_COLUMNS} FROM gallery_images WHERE id = ?1"),
                params![id],
                image_from_row,
            )
            .optional()?;
        Ok(image)
    }

    pub fn delete_gallery_image(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM gallery_images WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Uploads by one admin since the given instant. Drives the daily ceiling.
    pub fn count_gallery_uploads_since(
        &self,
        uploader_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, DbError> {
        let conn = self.conn()?;
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM gallery_images WHERE uploaded_by_id = ?1 AND created_at >= ?2",
            params![uploader_id, since.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
