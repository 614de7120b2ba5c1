//! Server settings: a JSON file at the platform config path, with
//! environment variable overrides applied on top.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ServerSettings;

/// Environment variables that override a settings key, as `(variable, key)`.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SAVEKAR_BIND", "server.bind"),
    ("APP_URL", "server.app_url"),
    ("SAVEKAR_DATABASE", "storage.database_path"),
    ("SAVEKAR_IDENTITY_HEADER", "auth.identity_header"),
    ("CRON_SECRET", "auth.cron_secret"),
    ("MICROLINK_ENDPOINT", "enrichment.microlink_endpoint"),
    ("GEMINI_API_KEY", "enrichment.gemini_api_key"),
    ("GEMINI_MODEL", "enrichment.gemini_model"),
    ("SAVEKAR_HTTP_TIMEOUT_SECS", "enrichment.timeout_secs"),
    ("MAIL_WEBHOOK_URL", "mail.webhook_url"),
    ("MAIL_FROM", "mail.from"),
];

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServerSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServerSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ServerSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `settings.json` in the
    /// platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ServerSettings::default(),
        }
    }

    /// Applies overrides from `lookup` (normally `std::env::var`) in memory.
    /// Nothing is written to disk.
    ///
    /// Blank values are ignored. A value that does not fit its key is an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            let raw = match lookup(var) {
                Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                _ => continue,
            };
            let value = match *key {
                "enrichment.timeout_secs" => {
                    let secs: u64 = raw.parse().map_err(|_| {
                        SettingsError::InvalidValue(format!("{} must be a number of seconds", var))
                    })?;
                    serde_json::json!(secs)
                }
                _ => serde_json::Value::String(raw),
            };
            debug!(variable = %var, key = %key, "settings override from environment");
            self.settings = with_value(&self.settings, key, value)?;
        }

        if let Some(origins) = lookup("SAVEKAR_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if !origins.is_empty() {
                self.settings.server.allowed_origins = origins;
            }
        }
        Ok(())
    }
}

/// Returns a copy of `settings` with the dot-notation `key` replaced by `value`.
fn with_value(
    settings: &ServerSettings,
    key: &str,
    value: serde_json::Value,
) -> Result<ServerSettings, SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }

    let mut json_value = serde_json::to_value(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| SettingsError::InvalidKey("Key cannot be empty".to_string()))?;

    let mut current = &mut json_value;
    for part in parents {
        current = current
            .get_mut(*part)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
    }
    match current {
        serde_json::Value::Object(map) if map.contains_key(*last) => {
            map.insert(last.to_string(), value);
        }
        serde_json::Value::Object(_) => {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
        _ => {
            return Err(SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            )));
        }
    }

    serde_json::from_value(json_value)
        .map_err(|e| SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e)))
}

impl SettingsEngineTrait for SettingsEngine {
    /// Missing file means defaults. A malformed file is an error.
    fn load(&mut self) -> Result<ServerSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = ServerSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            warn!(path = %self.config_path, error = %e, "malformed settings file");
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Updates one value by dot-notation key (`"server.bind"`,
    /// `"auth.cron_secret"`) and saves to disk.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.settings = with_value(&self.settings, key, value)?;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ServerSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
