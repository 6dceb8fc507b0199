//! Path safety validation for request-supplied subdirectories and filenames.
//!
//! These checks run before any filesystem mutation or network call. A request
//! can never produce a file outside the configured download directory.

use thiserror::Error;

/// Characters forbidden in filenames on common filesystems.
const RESERVED_CHARACTERS: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Rejection reasons for unsafe subdirectory or filename values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The filename is empty or whitespace-only.
    #[error("empty filename")]
    EmptyFilename,

    /// The value contains a parent-directory (`..`) segment.
    #[error("parent-directory segment in {value:?}")]
    ParentTraversal {
        /// The offending value.
        value: String,
    },

    /// The value is an absolute path.
    #[error("absolute path not allowed: {value:?}")]
    AbsolutePath {
        /// The offending value.
        value: String,
    },

    /// The value contains a character forbidden on common filesystems.
    #[error("forbidden character {character:?} in {value:?}")]
    ForbiddenCharacter {
        /// The offending value.
        value: String,
        /// The first forbidden character found.
        character: char,
    },
}

/// Validates a subdirectory value (possibly empty).
///
/// Separators are allowed so callers can nest subdirectories, but each
/// segment is checked: no `..` segments, no absolute-path prefix, no
/// reserved or control characters.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first problem found.
pub fn validate_subdir(subdir: &str) -> Result<(), ValidationError> {
    if subdir.is_empty() {
        return Ok(());
    }

    if subdir.starts_with('/') || subdir.starts_with('\\') || has_windows_drive_prefix(subdir) {
        return Err(ValidationError::AbsolutePath {
            value: subdir.to_string(),
        });
    }

    for segment in subdir.split(['/', '\\']) {
        if segment == ".." {
            return Err(ValidationError::ParentTraversal {
                value: subdir.to_string(),
            });
        }
        check_characters(subdir, segment)?;
    }

    Ok(())
}

/// Validates a single filename component.
///
/// Rejects empty names, dot segments, separators, absolute prefixes, and
/// reserved or control characters.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first problem found.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename == "." || filename == ".." {
        return Err(ValidationError::ParentTraversal {
            value: filename.to_string(),
        });
    }

    if let Some(character) = filename.chars().find(|c| matches!(c, '/' | '\\')) {
        return Err(ValidationError::ForbiddenCharacter {
            value: filename.to_string(),
            character,
        });
    }

    check_characters(filename, filename)
}

/// Checks one path segment for reserved and control characters.
fn check_characters(value: &str, segment: &str) -> Result<(), ValidationError> {
    if let Some(character) = segment
        .chars()
        .find(|c| RESERVED_CHARACTERS.contains(c) || c.is_control())
    {
        return Err(ValidationError::ForbiddenCharacter {
            value: value.to_string(),
            character,
        });
    }
    Ok(())
}

fn has_windows_drive_prefix(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}
