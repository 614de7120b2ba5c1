//! SaveKar: a personal knowledge hub backend.
//!
//! Bookmarks live in nested folders, carry tags with usage counts, and can
//! schedule an email reminder. The library exposes every module for the
//! server binary and the integration tests.

pub mod app;
pub mod database;
pub mod http_handler;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
