//! Club events and attendee registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub category: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub featured: bool,
    pub image_url: Option<String>,
    /// Embedded registrations, oldest first.
    pub attendees: Vec<Attendee>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether an admission number is already registered.
    pub fn has_attendee(&self, admission_number: &str) -> bool {
        self.attendees
            .iter()
            .any(|a| a.admission_number == admission_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub name: String,
    pub admission_number: String,
    pub registered_at: DateTime<Utc>,
}
