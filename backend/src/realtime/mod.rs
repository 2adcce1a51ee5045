//! Real-time fan-out to connected dashboard clients.
//!
//! Two broadcast channels back the WebSocket endpoint: the public
//! channel reaches every connected socket, the admin channel only
//! sockets that joined the admin room with a valid token.

pub mod ws;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{
    Application, ContactMessage, Event, GalleryCategory, GalleryImage, Notification,
    NotificationKind, NotificationPriority,
};

pub use ws::ws_handler;

const CHANNEL_CAPACITY: usize = 64;

/// Events pushed to clients, serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ChannelEvent {
    // Public feed
    NewEvent(Event),
    UpdateEvent(Event),
    DeleteEvent { id: String },
    NewGalleryImage(GalleryImageBroadcast),
    DeleteGalleryImage { id: String },
    NewNotification(NotificationBroadcast),
    UpdateNotification(NotificationBroadcast),
    DeleteNotification { id: String },
    // Admin room
    NewApplication(Application),
    UpdateApplication(Application),
    NewContactMessage(ContactMessage),
    UpdateContactMessage(ContactMessage),
}

/// Gallery payload in the shape the public feed renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageBroadcast {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: GalleryCategory,
    pub image_url: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<&GalleryImage> for GalleryImageBroadcast {
    fn from(image: &GalleryImage) -> Self {
        Self {
            id: image.id.clone(),
            title: image.title.clone(),
            description: image.description.clone(),
            category: image.category,
            image_url: image.image_url(),
            uploaded_by: image.uploaded_by.clone(),
            created_at: image.created_at,
        }
    }
}

/// Notification payload. Freshly created notifications omit the
/// activity flag and update timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBroadcast {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationBroadcast {
    pub fn created(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            kind: notification.kind,
            priority: notification.priority,
            is_active: None,
            created_at: notification.created_at,
            updated_at: None,
        }
    }

    pub fn updated(notification: &Notification) -> Self {
        Self {
            is_active: Some(notification.is_active),
            updated_at: Some(notification.updated_at),
            ..Self::created(notification)
        }
    }
}

/// Fan-out hub shared by route handlers and WebSocket connections.
#[derive(Clone)]
pub struct Broadcaster {
    public_tx: broadcast::Sender<ChannelEvent>,
    admin_tx: broadcast::Sender<ChannelEvent>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (public_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (admin_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            public_tx,
            admin_tx,
        }
    }

    /// Push to every connected client. No subscribers is not an error.
    pub fn broadcast(&self, event: ChannelEvent) {
        let _ = self.public_tx.send(event);
    }

    /// Push to clients that joined the admin room.
    pub fn broadcast_admin(&self, event: ChannelEvent) {
        let _ = self.admin_tx.send(event);
    }

    pub fn subscribe_public(&self) -> broadcast::Receiver<ChannelEvent> {
        self.public_tx.subscribe()
    }

    pub fn subscribe_admin(&self) -> broadcast::Receiver<ChannelEvent> {
        self.admin_tx.subscribe()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ChannelEvent::DeleteEvent {
            id: "e1".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "deleteEvent");
        assert_eq!(json["payload"]["id"], "e1");
    }

    #[test]
    fn notification_broadcast_keeps_kind_under_type_key() {
        let notification = Notification {
            id: "n1".to_string(),
            title: "Meeting".to_string(),
            message: "Friday 4pm".to_string(),
            kind: NotificationKind::Warning,
            priority: NotificationPriority::High,
            is_active: true,
            expires_at: None,
            created_by: "Admin".to_string(),
            created_by_id: "a1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let created = serde_json::to_value(ChannelEvent::NewNotification(
            NotificationBroadcast::created(&notification),
        ))
        .unwrap();
        assert_eq!(created["type"], "newNotification");
        assert_eq!(created["payload"]["type"], "warning");
        assert!(created["payload"].get("isActive").is_none());

        let updated = serde_json::to_value(ChannelEvent::UpdateNotification(
            NotificationBroadcast::updated(&notification),
        ))
        .unwrap();
        assert_eq!(updated["payload"]["isActive"], true);
    }

    #[tokio::test]
    async fn subscribers_receive_broadcasts() {
        let broadcaster = Broadcaster::new();
        let mut public_rx = broadcaster.subscribe_public();
        let mut admin_rx = broadcaster.subscribe_admin();

        broadcaster.broadcast(ChannelEvent::DeleteEvent {
            id: "e1".to_string(),
        });
        broadcaster.broadcast_admin(ChannelEvent::DeleteEvent {
            id: "e2".to_string(),
        });

        assert!(matches!(
            public_rx.recv().await.unwrap(),
            ChannelEvent::DeleteEvent { id } if id == "e1"
        ));
        assert!(matches!(
            admin_rx.recv().await.unwrap(),
            ChannelEvent::DeleteEvent { id } if id == "e2"
        ));
        assert!(public_rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_without_subscribers_is_silent() {
        let broadcaster = Broadcaster::new();
        broadcaster.broadcast(ChannelEvent::DeleteGalleryImage {
            id: "g1".to_string(),
        });
    }
}
