//! HTTP cache control module
//!
//! Provides `ETag` generation and conditional request handling.

use sha1::{Digest, Sha1};

/// Strong `ETag` for `content`: quoted, first 16 hex digits of its SHA-1
pub fn generate_etag(content: &[u8]) -> String {
    let digest = hex::encode(Sha1::digest(content));
    format!("\"{}\"", &digest[..16])
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a single tag, a comma separated list, `*`, and weak (`W/`)
/// validators, which compare equal to their strong form.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}
