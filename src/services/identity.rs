//! Resolves the calling owner from the identity header set by the
//! fronting auth layer.

use axum::http::HeaderMap;

use crate::types::errors::IdentityError;

/// Returns the trimmed value of `header`. Missing, blank or non-UTF-8
/// values are rejected.
pub fn resolve_owner(headers: &HeaderMap, header: &str) -> Result<String, IdentityError> {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(IdentityError::Missing)
}
