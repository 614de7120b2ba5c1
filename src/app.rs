//! App Core for SaveKar.
//!
//! Holds the shared database and the long-lived services. Folder, tag and
//! website managers borrow a connection and are created per request.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::database::{Database, SharedDatabase};
use crate::platform;
use crate::services::email_service::{EmailDispatcher, LogMailer, WebhookMailer};
use crate::services::metadata_enricher::{EnrichmentService, MetadataResolver};
use crate::services::reminder_dispatcher::ReminderDispatcher;
use crate::services::website_service::WebsiteService;
use crate::types::settings::ServerSettings;

pub struct App {
    pub db: SharedDatabase,
    pub settings: ServerSettings,
    pub websites: WebsiteService,
    pub reminders: ReminderDispatcher,
}

impl App {
    /// Opens the configured database and builds the network-backed services.
    pub fn new(settings: ServerSettings) -> anyhow::Result<Self> {
        let db_path: PathBuf = match settings.storage.database_path.as_deref() {
            Some(path) if !path.is_empty() => path.into(),
            _ => platform::default_database_path(),
        };
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&db_path)?.into_shared();
        info!(path = %db_path.display(), "database opened");

        let resolver: Arc<dyn MetadataResolver> =
            Arc::new(EnrichmentService::from_settings(&settings.enrichment));
        let mailer: Arc<dyn EmailDispatcher> = match settings.mail.webhook_url.as_deref() {
            Some(url) if !url.is_empty() => Arc::new(WebhookMailer::new(
                url.to_string(),
                settings.enrichment.timeout_secs,
            )),
            _ => {
                info!("no mail endpoint configured, reminders will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::with_parts(db, resolver, mailer, settings))
    }

    /// Assembles an app from already built parts.
    pub fn with_parts(
        db: SharedDatabase,
        resolver: Arc<dyn MetadataResolver>,
        mailer: Arc<dyn EmailDispatcher>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            websites: WebsiteService::new(db.clone(), resolver),
            reminders: ReminderDispatcher::new(db.clone(), mailer, &settings),
            db,
            settings,
        }
    }
}
