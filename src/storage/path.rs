use uuid::Uuid;

use super::StorageError;

pub const DEFAULT_FOLDER: &str = "uploads";

const MAX_SEGMENT_LEN: usize = 255;

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        "file".to_string()
    } else {
        safe
    }
}

/// Trims and validates a folder name, collapsing repeated slashes.
/// An empty folder falls back to `uploads`.
pub fn normalize_folder(folder: &str) -> Result<String, StorageError> {
    let folder = folder.trim();
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }

    let segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }

    for segment in &segments {
        validate_segment(segment)?;
    }

    Ok(segments.join("/"))
}

/// Validates a stored object path, as used when serving files back.
pub fn validate_object_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() || path.starts_with('/') {
        return Err(StorageError::InvalidPath);
    }
    path.split('/').try_for_each(validate_segment)
}

fn validate_segment(segment: &str) -> Result<(), StorageError> {
    // Dot-prefixed segments are reserved for the store's own temp files.
    if segment.is_empty() || segment.starts_with('.') {
        return Err(StorageError::InvalidPath);
    }
    if segment.len() > MAX_SEGMENT_LEN {
        return Err(StorageError::InvalidPath);
    }

    const INVALID_CHARS: &[char] = &['\0', '\n', '\r', '\\'];
    if segment.chars().any(|c| INVALID_CHARS.contains(&c)) {
        return Err(StorageError::InvalidPath);
    }

    Ok(())
}

/// `{folder}/{owner_id}/{uuid}-{sanitized filename}`
pub fn object_path(folder: &str, owner_id: &str, filename: &str) -> Result<String, StorageError> {
    let folder = normalize_folder(folder)?;
    validate_segment(owner_id)?;

    Ok(format!(
        "{folder}/{owner_id}/{}-{}",
        Uuid::new_v4(),
        sanitize_filename(filename)
    ))
}
