//! Membership application queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, parse_ts_opt, Database, DbError};
use crate::models::{Application, ApplicationStatus};

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    let status: String = row.get(6)?;
    Ok(Application {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        course: row.get(4)?,
        message: row.get(5)?,
        status: ApplicationStatus::parse(&status).unwrap_or(ApplicationStatus::Pending),
        reviewed_by: row.get(7)?,
        reviewed_at: parse_ts_opt(row.get(8)?),
        created_at: parse_ts(&row.get::<_, String>(9)?),
    })
}

const APPLICATION_COLUMNS: &str =
    "id, full_name, email, phone, course, message, status, reviewed_by, reviewed_at, created_at";

impl Database {
    pub fn insert_application(&self, application: &Application) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO applications (id, full_name, email, phone, course, message, status,
                                       reviewed_by, reviewed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                application.id,
                application.full_name,
                application.email,
                application.phone,
                application.course,
                application.message,
                application.status.as_str(),
                application.reviewed_by,
                application.reviewed_at.map(|at| at.to_rfc3339()),
                application.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_applications(&self) -> Result<Vec<Application>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY created_at DESC"
        ))?;
        let applications = stmt
            .query_map([], application_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(applications)
    }

    pub fn find_application(&self, id: &str) -> Result<Option<Application>, DbError> {
        let conn = self.conn()?;
        let application = conn
            .query_row(
                &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1"),
                params![id],
                application_from_row,
            )
            .optional()?;
        Ok(application)
    }

    /// Stamp a review decision. Returns false when no application had that id.
    pub fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
        reviewed_by: &str,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE applications SET status = ?1, reviewed_by = ?2, reviewed_at = ?3
             WHERE id = ?4",
            params![status.as_str(), reviewed_by, reviewed_at.to_rfc3339(), id],
        )?;
        Ok(affected > 0)
    }
}
