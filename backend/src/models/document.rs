//! Uploaded club documents (minutes, constitutions, forms).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub filename: String,
    /// Public path under `/uploads/documents/`.
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub uploaded_by: String,
    pub uploaded_by_id: String,
    pub created_at: DateTime<Utc>,
}
