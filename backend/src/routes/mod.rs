//! HTTP route handlers, one module per resource.

use serde::{Deserialize, Deserializer, Serialize};

pub mod applications;
pub mod auth;
pub mod contacts;
pub mod content;
pub mod documents;
pub mod events;
pub mod gallery;
pub mod health;
pub mod notifications;
pub mod users;

/// Plain `{"message": ...}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// For PATCH-style bodies: the outer `Option` says whether the key was
/// present, the inner one carries an explicit null.
pub(crate) fn double_option<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Light email shape check: something before the `@`, a dotted domain
/// after it, no whitespace. Real verification happens via the mail flow.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
