//! Event queries. Attendees are embedded as a JSON column.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, parse_ts_opt, Database, DbError};
use crate::models::{Attendee, Event};

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let attendees_json: String = row.get(9)?;
    let attendees: Vec<Attendee> = serde_json::from_str(&attendees_json).unwrap_or_default();
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        start: parse_ts(&row.get::<_, String>(3)?),
        end: parse_ts_opt(row.get(4)?),
        location: row.get(5)?,
        description: row.get(6)?,
        featured: row.get::<_, i32>(7)? != 0,
        image_url: row.get(8)?,
        attendees,
        created_at: parse_ts(&row.get::<_, String>(10)?),
    })
}

const EVENT_COLUMNS: &str = "id, title, category, start_at, end_at, location, description, \
                             featured, image_url, attendees, created_at";

fn attendees_json(attendees: &[Attendee]) -> Result<String, DbError> {
    serde_json::to_string(attendees)
        .map_err(|e| DbError::Database(rusqlite::Error::ToSqlConversionFailure(Box::new(e))))
}

impl Database {
    pub fn insert_event(&self, event: &Event) -> Result<(), DbError> {
        let attendees = attendees_json(&event.attendees)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO events (id, title, category, start_at, end_at, location, description,
                                 featured, image_url, attendees, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                event.id,
                event.title,
                event.category,
                event.start.to_rfc3339(),
                event.end.map(|at| at.to_rfc3339()),
                event.location,
                event.description,
                event.featured,
                event.image_url,
                attendees,
                event.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All events, soonest start first.
    pub fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_at ASC"
        ))?;
        let events = stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    pub fn find_event(&self, id: &str) -> Result<Option<Event>, DbError> {
        let conn = self.conn()?;
        let event = conn
            .query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![id],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    /// Replace every mutable field, attendees included. Returns false when
    /// no event had that id.
    pub fn update_event(&self, event: &Event) -> Result<bool, DbError> {
        let attendees = attendees_json(&event.attendees)?;
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE events
             SET title = ?1, category = ?2, start_at = ?3, end_at = ?4, location = ?5,
                 description = ?6, featured = ?7, image_url = ?8, attendees = ?9
             WHERE id = ?10",
            params![
                event.title,
                event.category,
                event.start.to_rfc3339(),
                event.end.map(|at| at.to_rfc3339()),
                event.location,
                event.description,
                event.featured,
                event.image_url,
                attendees,
                event.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_event(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
