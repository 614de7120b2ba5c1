// SaveKar store managers
// Managers own the owner-scoped, synchronous SQLite operations: folders, websites, tags.

pub mod folder_manager;
pub mod tag_manager;
pub mod website_manager;

use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};

use crate::types::folder::PALETTE;

/// Current time as UNIX milliseconds, the unit every timestamp column uses.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

/// Picks a colour from the palette for folders and tags created without one.
pub(crate) fn pick_color() -> &'static str {
    let mut byte = [0u8; 1];
    palette_entry(SystemRandom::new().fill(&mut byte).ok().map(|()| byte[0]))
}

/// Palette entry for a random byte; the first entry when the RNG failed.
fn palette_entry(random: Option<u8>) -> &'static str {
    PALETTE[random.map_or(0, |b| b as usize % PALETTE.len())]
}
