//! Collection path utilities
//!
//! A collection path alternates collection and entity segments
//! (`products/p1/locales`). Stripping removes the entity ids, leaving the
//! path used for permission lookups (`products/locales`). Composite ids join
//! stripped segments with [`COLLECTION_PATH_SEPARATOR`] and key persisted
//! collection documents (`products::locales`).

use crate::error::{CollectionError, CollectionResult};

/// Separator of composite collection ids.
pub const COLLECTION_PATH_SEPARATOR: &str = "::";

/// Remove leading/trailing slashes and entity id segments from a path.
///
/// # Examples
///
/// ```
/// use firecms_collections::paths::strip_collection_path;
///
/// assert_eq!(strip_collection_path("/products/"), "products");
/// assert_eq!(strip_collection_path("products/p1/locales"), "products/locales");
/// ```
pub fn strip_collection_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .step_by(2)
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip each collection segment and join them with `/`.
///
/// This is the key under which roles declare path-specific permissions.
pub fn segments_to_stripped_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| strip_collection_path(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the composite id under which a collection is stored.
///
/// Without ancestors the stripped path is returned as is; a path that
/// already contains the separator is taken to be a composite id. With
/// ancestors every segment is stripped, checked for the separator and joined
/// in ancestor order.
///
/// # Examples
///
/// ```
/// use firecms_collections::paths::build_collection_path;
///
/// assert_eq!(build_collection_path("products", &[], "::").unwrap(), "products");
/// assert_eq!(
///     build_collection_path("locales", &["products"], "::").unwrap(),
///     "products::locales"
/// );
/// ```
pub fn build_collection_path(
    path: &str,
    parent_segments: &[&str],
    separator: &str,
) -> CollectionResult<String> {
    if parent_segments.is_empty() {
        return Ok(strip_collection_path(path));
    }
    let mut parts = Vec::with_capacity(parent_segments.len() + 1);
    for segment in parent_segments.iter().copied().chain(std::iter::once(path)) {
        let stripped = strip_collection_path(segment);
        if stripped.contains(separator) {
            return Err(CollectionError::InvalidPathSegment {
                segment: segment.to_string(),
                separator: separator.to_string(),
            });
        }
        parts.push(stripped);
    }
    Ok(parts.join(separator))
}

/// Id of the parent collection, or `None` for a root id.
pub fn parent_id<'a>(id: &'a str, separator: &str) -> Option<&'a str> {
    id.rsplit_once(separator).map(|(parent, _)| parent)
}

/// Number of ancestors encoded in a composite id.
pub fn id_depth(id: &str, separator: &str) -> usize {
    id.matches(separator).count()
}

/// Segments of a composite id, root first.
pub fn id_segments<'a>(id: &'a str, separator: &'a str) -> impl Iterator<Item = &'a str> {
    id.split(separator)
}
