use serde::{Deserialize, Serialize};

/// Top-level service settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub server: HttpSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub enrichment: EnrichmentSettings,
    pub mail: MailSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server: HttpSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            enrichment: EnrichmentSettings::default(),
            mail: MailSettings::default(),
        }
    }
}

/// Listener and CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    pub bind: String,
    pub allowed_origins: Vec<String>,
    /// Public URL of the web app, linked from reminder emails.
    pub app_url: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            app_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Where the SQLite database lives. `None` means the platform data dir.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageSettings {
    pub database_path: Option<String>,
}

/// Identity and cron authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthSettings {
    /// Header carrying the authenticated owner id, set by the auth proxy.
    pub identity_header: String,
    /// Bearer secret required by the reminder dispatch endpoint.
    pub cron_secret: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            identity_header: "x-user-email".to_string(),
            cron_secret: None,
        }
    }
}

/// Metadata API and summarizer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub microlink_endpoint: String,
    pub gemini_endpoint: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub timeout_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            microlink_endpoint: "https://api.microlink.io/".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Reminder email delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MailSettings {
    /// Transactional mail endpoint. Without one, reminders are only logged.
    pub webhook_url: Option<String>,
    pub from: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            from: "SaveKar <reminders@savekar.app>".to_string(),
        }
    }
}
