//! User-facing access resolution
//!
//! Connects the raw navigation path of a collection to the role resolver:
//! entity ids are stripped from the path before the role tables are
//! consulted.

use firecms_rbac::{CollectionEditorPermissions, PermissionResolver, Permissions};
use serde::{Deserialize, Serialize};

use crate::collection::PersistedCollection;
use crate::paths::segments_to_stripped_path;

/// The authenticated user as the core sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsUser {
    pub uid: String,

    /// Role ids; `None` when the identity carries no role claim
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl CmsUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            roles: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// Permissions of a user on the collection at `path_segments`.
///
/// Segments may be raw navigation paths; they are stripped and joined
/// before lookup. A missing user gets no permissions.
pub fn resolve_collection_access<S: AsRef<str>>(
    resolver: &PermissionResolver,
    user: Option<&CmsUser>,
    path_segments: &[S],
) -> Permissions {
    let path = segments_to_stripped_path(path_segments);
    match user {
        Some(user) => resolver.resolve_for_user(user.roles.as_deref(), &path),
        None => Permissions::none(),
    }
}

/// Collection editor capabilities of a user on a stored collection.
pub fn resolve_editor_access(
    resolver: &PermissionResolver,
    user: Option<&CmsUser>,
    collection: &PersistedCollection,
) -> CollectionEditorPermissions {
    match user {
        Some(user) => resolver.resolve_editor_for_user(
            user.roles.as_deref(),
            collection.owner_id.as_deref(),
            Some(user.uid.as_str()),
        ),
        None => CollectionEditorPermissions::default(),
    }
}
