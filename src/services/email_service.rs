//! Reminder email rendering and delivery.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::types::errors::EmailError;
use crate::types::reminder::{OutgoingEmail, ReminderEmail};

/// Delivers a rendered email.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Display name derived from an owner id: the part before `@`.
pub fn display_name(owner_id: &str) -> &str {
    owner_id.split('@').next().unwrap_or(owner_id)
}

/// Renders the reminder for `reminder` with links to the content and to `app_url`.
pub fn render_reminder_email(reminder: &ReminderEmail, from: &str, app_url: &str) -> OutgoingEmail {
    let title = escape_html(&reminder.title);
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; border-radius: 10px 10px 0 0; }}
    .content {{ background: #f9f9f9; padding: 20px; border-radius: 0 0 10px 10px; }}
    .button {{ display: inline-block; background: #667eea; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    .footer {{ text-align: center; margin-top: 20px; color: #666; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>SaveKar Reminder</h1>
      <p>Your scheduled content is ready for review!</p>
    </div>
    <div class="content">
      <h2>Hi {user}!</h2>
      <p>You scheduled a reminder for this {kind}:</p>
      <div style="background: white; padding: 15px; border-radius: 8px; margin: 15px 0; border-left: 4px solid #667eea;">
        <h3 style="margin: 0 0 10px 0;">{title}</h3>
        <p style="color: #666; margin: 0;">Scheduled for: {date}</p>
      </div>
      <p>Click the button below to view your content:</p>
      <a href="{url}" class="button">View Content</a>
      <p>Or visit your SaveKar dashboard to manage all your saved content.</p>
      <a href="{app}" class="button" style="background: #764ba2;">Open SaveKar</a>
    </div>
    <div class="footer">
      <p>This reminder was sent from your SaveKar app. You can manage your reminders in your dashboard.</p>
    </div>
  </div>
</body>
</html>
"#,
        user = escape_html(&reminder.user_name),
        kind = reminder.content_type,
        title = title,
        date = reminder.scheduled_for.format("%B %-d, %Y"),
        url = escape_html(&reminder.url),
        app = escape_html(app_url),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: reminder.recipient.clone(),
        subject: format!("Reminder: {}", reminder.title),
        html,
    }
}

/// Posts `{from, to, subject, html}` JSON to a transactional mail endpoint.
pub struct WebhookMailer {
    endpoint: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl WebhookMailer {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl EmailDispatcher for WebhookMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(email)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| EmailError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected(format!("{}: {}", status, body)));
        }
        debug!(to = %email.to, "reminder email accepted by mail endpoint");
        Ok(())
    }
}

/// Logs emails instead of sending them. Used when no mail endpoint is set.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl EmailDispatcher for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        info!(to = %email.to, subject = %email.subject, "reminder email (log only)");
        Ok(())
    }
}
