//! Identifier sanitization.
//!
//! User-supplied column names are normalized rather than rejected:
//! anything that is not alphanumeric or an underscore becomes an
//! underscore, and a leading digit gets an `f_` prefix. Table names,
//! by contrast, must already be valid identifiers.

/// Normalizes an arbitrary string into a safe identifier.
///
/// Total and idempotent: sanitizing an already-sanitized string is a
/// no-op. The result is never empty and never starts with a digit.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    match cleaned.chars().next() {
        None => "f_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("f_{cleaned}"),
        Some(_) => cleaned,
    }
}

/// Returns true if `name` is a syntactically valid identifier:
/// non-empty, alphanumerics and underscores only, not starting with a
/// digit.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(c) if c.is_ascii_digit() => false,
        Some(c) if !(c.is_alphanumeric() || c == '_') => false,
        Some(_) => chars.all(|c| c.is_alphanumeric() || c == '_'),
    }
}
