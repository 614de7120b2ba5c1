use chrono::{DateTime, Utc};
use serde::Serialize;

use super::website::ContentType;

/// The content of a single reminder email.
#[derive(Debug, Clone)]
pub struct ReminderEmail {
    pub recipient: String,
    pub user_name: String,
    pub title: String,
    pub url: String,
    pub content_type: ContentType,
    pub scheduled_for: DateTime<Utc>,
}

/// Outcome of one reminder dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderReport {
    pub message: String,
    pub emails_sent: u32,
    pub errors: u32,
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}
