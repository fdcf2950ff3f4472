//! Doc name validation.
//!
//! A doc name becomes a filename directly under `docs/` and a trash key
//! `doc-<name>`, and it is the first segment of an eval path. Valid names:
//! - Must be non-empty
//! - Must not contain `/` or `\` (no nesting, no traversal)
//! - Must not contain control characters
//! - Must not start with `.` (hidden names are reserved for store internals)

use crate::error::{DocError, Result};

/// Validate a doc name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use zerve_docs::names::validate_doc_name;
///
/// assert!(validate_doc_name("counter").is_ok());
/// assert!(validate_doc_name("").is_err());
/// assert!(validate_doc_name("../etc").is_err());
/// ```
pub fn validate_doc_name(name: &str) -> Result<()> {
    let reject = |reason: &str| -> Result<()> {
        Err(DocError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("doc name must not be empty");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("must not contain path separators");
    }
    if name.chars().any(char::is_control) {
        return reject("must not contain control characters");
    }
    if name.starts_with('.') {
        return reject("must not start with '.'");
    }
    Ok(())
}
