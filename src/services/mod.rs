// SaveKar services
// Enrichment clients, website creation flows, reminders, identity and settings.

pub mod email_service;
pub mod gemini;
pub mod identity;
pub mod metadata_enricher;
pub mod microlink;
pub mod reminder_dispatcher;
pub mod settings_engine;
pub mod url_classifier;
pub mod website_service;

