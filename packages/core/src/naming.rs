//! Document naming rules: validation, extension-preserving renames and
//! collision policies.

use serde::{Deserialize, Serialize};

use crate::error::JobError;

const MAX_NAME_LEN: usize = 255;

/// Characters a storage key cannot hold verbatim.
const RESERVED_CHARS: [char; 15] = [
    '[', ']', '#', '%', '{', '}', '^', '~', '<', '>', '|', '"', '*', '?', '`',
];

/// What `submit` does when the requested document name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the submission with `DuplicateName`.
    #[default]
    Reject,
    /// Store under `stem-N.ext` with the smallest free `N`.
    Suffix,
}

/// What happens to a document once its job is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep the file for audit. Its name stays taken until removed by hand.
    #[default]
    Retain,
    /// Delete the file and free the name.
    Delete,
}

/// Check that `name` is a single plain file name.
pub fn validate_document_name(name: &str) -> Result<(), JobError> {
    let invalid = |reason| JobError::InvalidDocumentName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name != name.trim() {
        return Err(invalid("leading or trailing whitespace"));
    }
    if name == "." || name == ".." {
        return Err(invalid("reserved name"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("path separators are not allowed"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("control characters are not allowed"));
    }
    if name.contains(RESERVED_CHARS) {
        return Err(invalid("characters [ ] # % { } ^ ~ < > | \" * ? ` are not allowed"));
    }
    if !name.is_ascii() {
        return Err(invalid("only ASCII characters are allowed"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name is too long"));
    }
    Ok(())
}

/// Extension of `name` including the dot, or `""`.
///
/// A leading dot alone does not start an extension (`.profile` has none).
pub fn extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => &name[idx..],
        _ => "",
    }
}

/// `name` without its extension.
pub fn stem(name: &str) -> &str {
    &name[..name.len() - extension(name).len()]
}

/// Final name for renaming `current` to `requested`: the current extension is
/// appended unless `requested` already ends with it.
pub fn rename_target(current: &str, requested: &str) -> Result<String, JobError> {
    let requested = requested.trim();
    validate_document_name(requested)?;
    let ext = extension(current);

    let target = if requested.ends_with(ext) {
        requested.to_string()
    } else {
        format!("{requested}{ext}")
    };

    validate_document_name(&target)?;
    Ok(target)
}

/// `stem-n.ext` variant of `name`.
pub fn suffixed(name: &str, n: u32) -> String {
    format!("{}-{}{}", stem(name), n, extension(name))
}
