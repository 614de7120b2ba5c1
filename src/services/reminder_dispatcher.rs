//! Reminder dispatch: finds due reminders across all owners, emails them
//! and marks each one sent at most once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ring::hmac;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::email_service::{display_name, render_reminder_email, EmailDispatcher};
use crate::database::connection::lock;
use crate::database::SharedDatabase;
use crate::managers::website_manager::{due_reminders, mark_reminder_sent};
use crate::types::errors::ReminderError;
use crate::types::reminder::{ReminderEmail, ReminderReport};
use crate::types::settings::ServerSettings;
use crate::types::website::Website;

const SECRET_CONTEXT: &[u8] = b"savekar reminder dispatch";

pub struct ReminderDispatcher {
    db: SharedDatabase,
    mailer: Arc<dyn EmailDispatcher>,
    /// HMAC of the configured cron secret; `None` rejects every caller.
    expected: Option<hmac::Tag>,
    from: String,
    app_url: String,
    /// Held for a whole run so overlapping runs never email the same row.
    run: Mutex<()>,
}

fn secret_tag(secret: &str) -> hmac::Tag {
    hmac::sign(&hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()), SECRET_CONTEXT)
}

impl ReminderDispatcher {
    pub fn new(db: SharedDatabase, mailer: Arc<dyn EmailDispatcher>, settings: &ServerSettings) -> Self {
        Self {
            db,
            mailer,
            expected: settings
                .auth
                .cron_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(secret_tag),
            from: settings.mail.from.clone(),
            app_url: settings.server.app_url.clone(),
            run: Mutex::new(()),
        }
    }

    /// Checks an `Authorization: Bearer <secret>` header value in constant time.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ReminderError> {
        let expected = self.expected.as_ref().ok_or(ReminderError::Unauthorized)?;
        let presented = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(ReminderError::Unauthorized)?;

        let key = hmac::Key::new(hmac::HMAC_SHA256, presented.as_bytes());
        hmac::verify(&key, SECRET_CONTEXT, expected.as_ref()).map_err(|_| ReminderError::Unauthorized)
    }

    fn reminder_for(website: &Website, now: DateTime<Utc>) -> ReminderEmail {
        ReminderEmail {
            recipient: website.owner_id.clone(),
            user_name: display_name(&website.owner_id).to_string(),
            title: website.title.clone(),
            url: website.url.clone(),
            content_type: website.content_type,
            scheduled_for: website.scheduled_for.unwrap_or(now),
        }
    }

    /// Sends every reminder due at `now`. A failed email or mark counts as an
    /// error and leaves the entry due for the next run. Runs are serialized:
    /// a concurrent call waits and then sees the rows the first one marked.
    pub async fn send_due(&self, now: DateTime<Utc>) -> Result<ReminderReport, ReminderError> {
        let _run = self.run.lock().await;
        let due = {
            let db = lock(&self.db).map_err(ReminderError::DatabaseError)?;
            due_reminders(db.connection(), now.timestamp_millis())
                .map_err(|e| ReminderError::DatabaseError(e.to_string()))?
        };

        let mut report = ReminderReport {
            message: format!("Processed {} reminders", due.len()),
            ..Default::default()
        };

        for website in &due {
            let email = render_reminder_email(&Self::reminder_for(website, now), &self.from, &self.app_url);
            if let Err(e) = self.mailer.send(&email).await {
                warn!(website_id = %website.id, error = %e, "reminder email failed");
                report.errors += 1;
                continue;
            }

            let marked = lock(&self.db)
                .map_err(ReminderError::DatabaseError)
                .and_then(|db| {
                    mark_reminder_sent(db.connection(), &website.id)
                        .map_err(|e| ReminderError::DatabaseError(e.to_string()))
                });
            match marked {
                Ok(true) => report.emails_sent += 1,
                Ok(false) => {
                    warn!(website_id = %website.id, "reminder already marked sent");
                    report.emails_sent += 1;
                }
                Err(e) => {
                    error!(website_id = %website.id, error = %e, "failed to mark reminder sent");
                    report.errors += 1;
                }
            }
        }

        info!(
            due = due.len(),
            sent = report.emails_sent,
            errors = report.errors,
            "reminder dispatch finished"
        );
        Ok(report)
    }
}
