//! Identifier helpers shared by the store and the provider.
//!
//! The store keys items by the canonical string form `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`;
//! the host side works with `Uuid`.

use uuid::Uuid;

/// Default language for lookups that do not name one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default database tag stamped on created items
pub const DEFAULT_DATABASE: &str = "master";

/// Canonical string form of an identifier (braced, upper case)
pub fn canonical_id(id: Uuid) -> String {
    let mut buf = Uuid::encode_buffer();
    format!("{{{}}}", id.hyphenated().encode_upper(&mut buf))
}

/// Canonical form of the null identifier
pub fn null_id() -> String {
    canonical_id(Uuid::nil())
}

/// Parse a stored identifier. Empty strings yield `None`.
pub fn parse_id(raw: &str) -> Option<Result<Uuid, uuid::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Uuid::parse_str(trimmed))
}

/// Case-insensitive lookup key for ids and paths.
///
/// Folds to upper case per character, so both Greek lower sigmas meet at `Σ`.
pub(crate) fn fold_key(raw: &str) -> String {
    raw.chars().flat_map(char::to_uppercase).collect()
}
