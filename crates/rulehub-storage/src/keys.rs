//! Storage key and display name derivation
//!
//! Clients should reference media by the bare key returned as `file_id`
//! (`3f2a..-..`). Paths (`uploads/3f2a.._cat.png`) and URLs are also
//! accepted, but a whole reference must fit the 128 character media limit,
//! which a signed upload URL never does. The storage key is always the last
//! path segment. The display name
//! is derived separately from that segment by dropping a leading `<uuid>_`
//! prefix when one is present.

use uuid::Uuid;

use crate::error::StorageError;

pub const MAX_KEY_LEN: usize = 256;

/// Fresh, globally unique object key
pub fn new_object_key() -> String {
    Uuid::new_v4().to_string()
}

/// Derive the storage key a media reference points at
pub fn storage_key_from_reference(reference: &str) -> Result<String, StorageError> {
    let key = last_segment(reference);
    validate_key(&key)?;
    Ok(key)
}

/// Human readable file name for a media reference
pub fn display_name(reference: &str) -> String {
    let segment = last_segment(reference);
    match segment.split_once('_') {
        Some((prefix, rest)) if !rest.is_empty() && Uuid::parse_str(prefix).is_ok() => {
            rest.to_string()
        }
        _ => segment,
    }
}

pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(
            "storage key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey(format!(
            "storage key must be at most {} bytes",
            MAX_KEY_LEN
        )));
    }
    if key == "." || key == ".." {
        return Err(StorageError::InvalidKey(format!(
            "'{}' is not a valid storage key",
            key
        )));
    }
    if key
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(StorageError::InvalidKey(format!(
            "storage key '{}' contains a separator or whitespace",
            key
        )));
    }
    Ok(())
}

fn last_segment(reference: &str) -> String {
    let reference = reference.trim();

    if reference.starts_with("http://") || reference.starts_with("https://") {
        if let Ok(url) = url::Url::parse(reference) {
            let segment = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .unwrap_or_default();
            return urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string());
        }
    }

    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
