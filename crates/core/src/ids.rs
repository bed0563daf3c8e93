//! Identifier validation.

use uuid::Uuid;

/// Returns true when `value` is a canonical hyphenated UUID (8-4-4-4-12).
///
/// `Uuid::parse_str` also accepts the simple, braced, and URN forms; the
/// feed grammar admits only the hyphenated shape, which the length check
/// pins down.
#[must_use]
pub fn is_canonical_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::parse_str(value).is_ok()
}
