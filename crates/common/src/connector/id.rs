//! Translation between hierarchical node ids and flat blob keys.
//!
//! A node id always starts with [`DELIMITER`]. Structural ids (`/a/b/c`)
//! name folders and files; content ids (`/a/b/c/jcr:content`) name the
//! synthetic binary-bearing child of a file. Everything in here is pure.

use super::ConnectorError;

pub const DELIMITER: &str = "/";
pub const JCR_CONTENT: &str = "jcr:content";
pub const CONTENT_SUFFIX: &str = "/jcr:content";

/// The root id
pub const ROOT_ID: &str = DELIMITER;

pub fn is_root_id(id: &str) -> bool {
    id == ROOT_ID
}

pub fn is_content_id(id: &str) -> bool {
    id.ends_with(CONTENT_SUFFIX)
}

/// Derive the blob key for a structural or content id.
///
/// Strips the leading delimiter, any trailing delimiter and the content
/// suffix. The result never starts or ends with the delimiter and never
/// carries the content suffix, so re-deriving from `"/" + key` is a no-op.
pub fn blob_key(id: &str) -> Result<String, ConnectorError> {
    if id.is_empty() {
        return Err(ConnectorError::InvalidIdentifier(id.to_string()));
    }

    let mut key = id;
    loop {
        let trimmed = key.trim_end_matches(DELIMITER);
        let trimmed = trimmed.strip_suffix(CONTENT_SUFFIX).unwrap_or(trimmed);
        if trimmed.len() == key.len() {
            break;
        }
        key = trimmed;
    }

    Ok(key.trim_start_matches(DELIMITER).to_string())
}

/// Reduce an externally resolvable locator (`{url_prefix}/{container}/{key}`)
/// to its store-local key.
///
/// # Panics
///
/// If the locator was not produced for this url prefix and container.
pub fn blob_key_from_remote_name(remote_name: &str, url_prefix: &str, container: &str) -> String {
    let prefix = format!("{}{}{}{}", url_prefix, DELIMITER, container, DELIMITER);
    match remote_name.strip_prefix(&prefix) {
        Some(key) => key.to_string(),
        None => panic!(
            "locator '{}' is not within '{}'",
            remote_name, prefix
        ),
    }
}

/// The externally resolvable locator for a blob key
pub fn remote_name(url_prefix: &str, container: &str, key: &str) -> String {
    format!("{}{}{}{}{}", url_prefix, DELIMITER, container, DELIMITER, key)
}

/// The id one segment up, or `None` for the root.
///
/// Trailing delimiters are ignored, so `/a/` has the parent `/`.
pub fn parent_id(id: &str) -> Option<String> {
    let id = id.trim_end_matches(DELIMITER);
    if id.is_empty() {
        return None;
    }
    let index = id.rfind(DELIMITER)?;
    let parent = &id[..index];
    if parent.is_empty() {
        Some(ROOT_ID.to_string())
    } else {
        Some(parent.to_string())
    }
}

/// The last path segment of an id or remote name.
pub fn child_name(id: &str) -> &str {
    if id.len() <= DELIMITER.len() {
        return id;
    }
    match id.rfind(DELIMITER) {
        Some(index) => &id[index + DELIMITER.len()..],
        None => id,
    }
}

/// The content child id of a structural id
pub fn content_id(id: &str) -> String {
    if is_root_id(id) {
        CONTENT_SUFFIX.to_string()
    } else {
        format!("{}{}", id.trim_end_matches(DELIMITER), CONTENT_SUFFIX)
    }
}

/// The structural id addressing a blob key
pub fn id_for_key(key: &str) -> String {
    format!("{}{}", DELIMITER, key)
}

/// Join a parent id and a (possibly namespaced) child name into a new id.
///
/// The content child keeps its full name so [`is_content_id`] recognizes
/// it. Other names drop their namespace prefix since blob keys have no
/// namespaces; the second tuple element carries the dropped prefix.
pub fn join_child(parent_id: &str, name: &str) -> (String, Option<String>) {
    let mut id = String::from(parent_id);
    if !parent_id.ends_with(DELIMITER) {
        id.push_str(DELIMITER);
    }

    if name == JCR_CONTENT {
        id.push_str(name);
        return (id, None);
    }

    match name.split_once(':') {
        Some((namespace, local)) if !namespace.is_empty() => {
            id.push_str(local);
            (id, Some(namespace.to_string()))
        }
        _ => {
            id.push_str(name);
            (id, None)
        }
    }
}
