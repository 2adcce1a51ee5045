//! Admin account queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, Database, DbError};
use crate::models::Admin;

fn admin_from_row(row: &Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        super_admin: row.get::<_, i32>(5)? != 0,
        avatar: row.get(6)?,
        last_active_at: parse_ts(&row.get::<_, String>(7)?),
        created_at: parse_ts(&row.get::<_, String>(8)?),
    })
}

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, role, super_admin, avatar, last_active_at, created_at";

impl Database {
    pub fn insert_admin(&self, admin: &Admin) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO admins (id, name, email, password_hash, role, super_admin, avatar,
                                 last_active_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                admin.id,
                admin.name,
                admin.email,
                admin.password_hash,
                admin.role,
                admin.super_admin,
                admin.avatar,
                admin.last_active_at.to_rfc3339(),
                admin.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_admin_by_id(&self, id: &str) -> Result<Option<Admin>, DbError> {
        let conn = self.conn()?;
        let admin = conn
            .query_row(
                &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?1"),
                params![id],
                admin_from_row,
            )
            .optional()?;
        Ok(admin)
    }

    /// Lookup by email. Emails are stored lowercased; callers lowercase first.
    pub fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, DbError> {
        let conn = self.conn()?;
        let admin = conn
            .query_row(
                &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = ?1"),
                params![email],
                admin_from_row,
            )
            .optional()?;
        Ok(admin)
    }

    pub fn list_admins(&self) -> Result<Vec<Admin>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at ASC"
        ))?;
        let admins = stmt
            .query_map([], admin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(admins)
    }

    pub fn count_admins(&self) -> Result<u32, DbError> {
        let conn = self.conn()?;
        let count: u32 = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_super_admins(&self) -> Result<u32, DbError> {
        let conn = self.conn()?;
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM admins WHERE super_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn update_last_active(&self, id: &str, at: DateTime<Utc>) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE admins SET last_active_at = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), id],
        )?;
        Ok(())
    }

    pub fn update_admin_profile(&self, id: &str, name: &str, email: &str) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE admins SET name = ?1, email = ?2 WHERE id = ?3",
            params![name, email, id],
        )?;
        Ok(())
    }

    pub fn update_admin_avatar(&self, id: &str, avatar: Option<&str>) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE admins SET avatar = ?1 WHERE id = ?2",
            params![avatar, id],
        )?;
        Ok(())
    }

    pub fn promote_to_super_admin(&self, id: &str) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE admins SET super_admin = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    /// Returns false when no admin had that id.
    pub fn delete_admin(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM admins WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
