//! Gallery images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gallery categories shown as filters on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryCategory {
    Adventure,
    Service,
    Training,
    Ceremony,
    Other,
}

impl GalleryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryCategory::Adventure => "adventure",
            GalleryCategory::Service => "service",
            GalleryCategory::Training => "training",
            GalleryCategory::Ceremony => "ceremony",
            GalleryCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "adventure" => Some(GalleryCategory::Adventure),
            "service" => Some(GalleryCategory::Service),
            "training" => Some(GalleryCategory::Training),
            "ceremony" => Some(GalleryCategory::Ceremony),
            "other" => Some(GalleryCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for GalleryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: GalleryCategory,
    pub filename: String,
    /// Public path under `/uploads/gallery/`.
    pub file_path: String,
    pub file_size: u64,
    pub uploaded_by: String,
    pub uploaded_by_id: String,
    pub created_at: DateTime<Utc>,
}

impl GalleryImage {
    /// URL the frontend loads the image from. Files are stored under a
    /// per-category subdirectory.
    pub fn image_url(&self) -> String {
        format!("/uploads/gallery/{}/{}", self.category, self.filename)
    }
}
