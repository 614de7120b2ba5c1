use thiserror::Error;

use super::website::Website;

/// Coarse classification shared by every error in the crate.
///
/// The HTTP layer maps these onto status codes; callers never see more
/// than the kind and a human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

/// Returns true when a rusqlite error is a UNIQUE index violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

// === FolderError ===

/// Errors related to folder hierarchy operations.
#[derive(Debug, Error)]
pub enum FolderError {
    /// The folder name was blank after trimming.
    #[error("Folder name is required")]
    EmptyName,
    /// Folder with the given ID was not found for this owner.
    #[error("Folder not found")]
    NotFound(String),
    /// The requested parent folder does not exist for this owner.
    #[error("Parent folder not found")]
    ParentNotFound(String),
    /// A sibling folder already uses this name.
    #[error("Folder with this name already exists")]
    DuplicateName(String),
    /// The folder still has child folders.
    #[error("Cannot delete folder with subfolders. Please delete subfolders first.")]
    HasSubfolders(String),
    /// Database operation failed.
    #[error("Folder database error: {0}")]
    DatabaseError(String),
}

impl FolderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolderError::EmptyName => ErrorKind::BadRequest,
            FolderError::NotFound(_) | FolderError::ParentNotFound(_) => ErrorKind::NotFound,
            FolderError::DuplicateName(_) | FolderError::HasSubfolders(_) => ErrorKind::Conflict,
            FolderError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

// === WebsiteError ===

/// Errors related to website placement operations.
#[derive(Debug, Error)]
pub enum WebsiteError {
    /// No URL was supplied.
    #[error("URL is required")]
    MissingUrl,
    /// A replace request did not name the entry to replace.
    #[error("URL and replaceId are required")]
    MissingReplaceId,
    /// Website with the given ID was not found for this owner.
    #[error("Website not found")]
    NotFound(String),
    /// The target folder was not found for this owner.
    #[error("Folder not found")]
    FolderNotFound(String),
    /// The owner already saved this URL. Carries the existing entry.
    #[error("This website already exists in your collection")]
    DuplicateUrl(Box<Website>),
    /// The URL collides with another entry during an update.
    #[error("Another website already uses this URL")]
    UrlTaken(String),
    /// The reminder time could not be parsed.
    #[error("Invalid scheduledFor value: {0}")]
    InvalidSchedule(String),
    /// Unknown content type.
    #[error("Invalid website type: {0}")]
    InvalidContentType(String),
    /// Database operation failed.
    #[error("Website database error: {0}")]
    DatabaseError(String),
}

impl WebsiteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebsiteError::MissingUrl
            | WebsiteError::MissingReplaceId
            | WebsiteError::InvalidSchedule(_)
            | WebsiteError::InvalidContentType(_) => ErrorKind::BadRequest,
            WebsiteError::NotFound(_) | WebsiteError::FolderNotFound(_) => ErrorKind::NotFound,
            WebsiteError::DuplicateUrl(_) | WebsiteError::UrlTaken(_) => ErrorKind::Conflict,
            WebsiteError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl From<TagError> for WebsiteError {
    fn from(err: TagError) -> Self {
        WebsiteError::DatabaseError(err.to_string())
    }
}

// === TagError ===

/// Errors related to tag usage tracking.
#[derive(Debug, Error)]
pub enum TagError {
    /// The tag name was blank after trimming.
    #[error("Tag name is required")]
    EmptyName,
    /// Database operation failed.
    #[error("Tag database error: {0}")]
    DatabaseError(String),
}

impl TagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TagError::EmptyName => ErrorKind::BadRequest,
            TagError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

// === MetadataError ===

/// Errors raised by the metadata and summarizer clients.
///
/// These never abort a website creation; the enricher falls back to
/// type-specific defaults.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A network error occurred while talking to the provider.
    #[error("Metadata network error: {0}")]
    NetworkError(String),
    /// The provider answered with a failure status.
    #[error("Metadata provider error: {0}")]
    ProviderError(String),
    /// The provider response could not be understood.
    #[error("Metadata parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry query credentials.
        MetadataError::NetworkError(err.without_url().to_string())
    }
}

// === EmailError ===

/// Errors related to reminder email delivery.
#[derive(Debug, Error)]
pub enum EmailError {
    /// A network error occurred while contacting the mail endpoint.
    #[error("Email network error: {0}")]
    NetworkError(String),
    /// The mail endpoint rejected the message.
    #[error("Email rejected: {0}")]
    Rejected(String),
}

// === ReminderError ===

/// Errors related to the reminder dispatch run as a whole.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The caller did not present the configured cron secret.
    #[error("Unauthorized")]
    Unauthorized,
    /// Database operation failed.
    #[error("Reminder database error: {0}")]
    DatabaseError(String),
}

impl ReminderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReminderError::Unauthorized => ErrorKind::Unauthorized,
            ReminderError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

// === IdentityError ===

/// Errors related to resolving the calling owner.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No owner identity accompanied the request.
    #[error("Unauthorized")]
    Missing,
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
