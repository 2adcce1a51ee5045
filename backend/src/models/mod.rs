//! Stored document types and their wire representations.

pub mod admin;
pub mod application;
pub mod contact;
pub mod content;
pub mod document;
pub mod event;
pub mod gallery;
pub mod notification;

pub use admin::{Admin, AdminProfile};
pub use application::{Application, ApplicationStatus};
pub use contact::ContactMessage;
pub use content::ContentBlock;
pub use document::Document;
pub use event::{Attendee, Event};
pub use gallery::{GalleryCategory, GalleryImage};
pub use notification::{Notification, NotificationKind, NotificationPriority};
