//! Notification queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, parse_ts_opt, Database, DbError};
use crate::models::{Notification, NotificationKind, NotificationPriority};

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(3)?;
    let priority: String = row.get(4)?;
    Ok(Notification {
        id: row.get(0)?,
        title: row.get(1)?,
        message: row.get(2)?,
        kind: NotificationKind::parse(&kind).unwrap_or(NotificationKind::Info),
        priority: NotificationPriority::parse(&priority).unwrap_or(NotificationPriority::Medium),
        is_active: row.get::<_, i32>(5)? != 0,
        expires_at: parse_ts_opt(row.get(6)?),
        created_by: row.get(7)?,
        created_by_id: row.get(8)?,
        created_at: parse_ts(&row.get::<_, String>(9)?),
        updated_at: parse_ts(&row.get::<_, String>(10)?),
    })
}

const NOTIFICATION_COLUMNS: &str = "id, title, message, kind, priority, is_active, expires_at, \
                                    created_by, created_by_id, created_at, updated_at";

impl Database {
    pub fn insert_notification(&self, notification: &Notification) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notifications (id, title, message, kind, priority, is_active,
                                        expires_at, created_by, created_by_id, created_at,
                                        updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                notification.id,
                notification.title,
                notification.message,
                notification.kind.as_str(),
                notification.priority.as_str(),
                notification.is_active,
                notification.expires_at.map(|at| at.to_rfc3339()),
                notification.created_by,
                notification.created_by_id,
                notification.created_at.to_rfc3339(),
                notification.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Everything, for the admin dashboard. Newest first.
    pub fn list_notifications(&self) -> Result<Vec<Notification>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY created_at DESC"
        ))?;
        let notifications = stmt
            .query_map([], notification_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notifications)
    }

    /// Active and unexpired, for the public feed. Newest first, capped.
    pub fn active_notifications(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Notification>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE is_active = 1 AND (expires_at IS NULL OR expires_at > ?1)
             ORDER BY created_at DESC LIMIT ?2"
        ))?;
        let notifications = stmt
            .query_map(params![now.to_rfc3339(), limit], notification_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notifications)
    }

    pub fn find_notification(&self, id: &str) -> Result<Option<Notification>, DbError> {
        let conn = self.conn()?;
        let notification = conn
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![id],
                notification_from_row,
            )
            .optional()?;
        Ok(notification)
    }

    pub fn update_notification(&self, notification: &Notification) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE notifications
             SET title = ?1, message = ?2, kind = ?3, priority = ?4, is_active = ?5,
                 expires_at = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                notification.title,
                notification.message,
                notification.kind.as_str(),
                notification.priority.as_str(),
                notification.is_active,
                notification.expires_at.map(|at| at.to_rfc3339()),
                notification.updated_at.to_rfc3339(),
                notification.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_notification(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_notification(id: &str, active: bool, expires_at: Option<DateTime<Utc>>) -> Notification {
        Notification {
            id: id.to_string(),
            title: "Notice".to_string(),
            message: "Hello".to_string(),
            kind: NotificationKind::Info,
            priority: NotificationPriority::Low,
            is_active: active,
            expires_at,
            created_by: "Admin".to_string(),
            created_by_id: "a1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_feed_filters_inactive_and_expired() {
        let db = Database::open(":memory:").unwrap();
        let now = Utc::now();
        db.insert_notification(&test_notification("live", true, None))
            .unwrap();
        db.insert_notification(&test_notification(
            "future",
            true,
            Some(now + Duration::days(1)),
        ))
        .unwrap();
        db.insert_notification(&test_notification(
            "expired",
            true,
            Some(now - Duration::days(1)),
        ))
        .unwrap();
        db.insert_notification(&test_notification("off", false, None))
            .unwrap();

        let active = db.active_notifications(now, 10).unwrap();
        let ids: Vec<&str> = active.iter().map(|n| n.id.as_str()).collect();
        assert!(ids.contains(&"live"));
        assert!(ids.contains(&"future"));
        assert!(!ids.contains(&"expired"));
        assert!(!ids.contains(&"off"));

        assert_eq!(db.list_notifications().unwrap().len(), 4);
    }

    #[test]
    fn update_and_delete() {
        let db = Database::open(":memory:").unwrap();
        let mut notification = test_notification("n1", true, None);
        db.insert_notification(&notification).unwrap();

        notification.is_active = false;
        notification.priority = NotificationPriority::High;
        assert!(db.update_notification(&notification).unwrap());

        let stored = db.find_notification("n1").unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.priority, NotificationPriority::High);

        assert!(db.delete_notification("n1").unwrap());
        assert!(!db.update_notification(&notification).unwrap());
    }
}
