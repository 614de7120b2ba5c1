// SaveKar shared type definitions
// Each submodule defines types used across the application.

pub mod errors;
pub mod folder;
pub mod metadata;
pub mod reminder;
pub mod settings;
pub mod tag;
pub mod website;
