//! Contact message queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, parse_ts_opt, Database, DbError};
use crate::models::ContactMessage;

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        responded: row.get::<_, i32>(5)? != 0,
        responded_by: row.get(6)?,
        response_message: row.get(7)?,
        responded_at: parse_ts_opt(row.get(8)?),
        created_at: parse_ts(&row.get::<_, String>(9)?),
    })
}

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, responded, responded_by, \
                               response_message, responded_at, created_at";

impl Database {
    pub fn insert_contact(&self, contact: &ContactMessage) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO contact_messages (id, name, email, subject, message, responded,
                                           responded_by, response_message, responded_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                contact.id,
                contact.name,
                contact.email,
                contact.subject,
                contact.message,
                contact.responded,
                contact.responded_by,
                contact.response_message,
                contact.responded_at.map(|at| at.to_rfc3339()),
                contact.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_contacts(&self) -> Result<Vec<ContactMessage>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY created_at DESC"
        ))?;
        let contacts = stmt
            .query_map([], contact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contacts)
    }

    pub fn find_contact(&self, id: &str) -> Result<Option<ContactMessage>, DbError> {
        let conn = self.conn()?;
        let contact = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = ?1"),
                params![id],
                contact_from_row,
            )
            .optional()?;
        Ok(contact)
    }

    /// Record a response. Returns false when no message had that id.
    pub fn respond_to_contact(
        &self,
        id: &str,
        responded_by: &str,
        response_message: &str,
        responded_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE contact_messages
             SET responded = 1, responded_by = ?1, response_message = ?2, responded_at = ?3
             WHERE id = ?4",
            params![responded_by, response_message, responded_at.to_rfc3339(), id],
        )?;
        Ok(affected > 0)
    }
}
