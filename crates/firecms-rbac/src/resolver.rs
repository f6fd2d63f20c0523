//! # Permission resolution
//!
//! Computes the effective permissions of a user on a collection from the
//! roles they hold. Resolution never fails: missing roles or unknown paths
//! resolve to fewer permissions, never to more.

use serde::{Deserialize, Serialize};

use crate::permissions::Permissions;
use crate::roles::{get_user_roles, Role, RoleTable};

/// Permissions of a single role on a stripped collection path.
///
/// The role's base (all granted for admins, nothing otherwise) is merged with
/// the path-specific entry when one exists, or else with the role's default
/// permissions.
pub fn resolve_collection_role(role: &Role, path: &str) -> Permissions {
    let base = role.base_permissions();
    if let Some(specific) = role.permissions_for_path(path) {
        specific.merge(base)
    } else if let Some(defaults) = role.default_permissions {
        defaults.merge(base)
    } else {
        base
    }
}

/// Effective permissions of a set of roles on a stripped collection path.
///
/// A capability is granted if any role grants it. An empty role list
/// resolves to no permissions.
///
/// # Example
///
/// ```
/// use firecms_rbac::{resolve_collection_permissions, Permissions, Role};
///
/// let editor = Role::new("editor", "Editor")
///     .with_default_permissions(Permissions::new(true, true, true, false));
///
/// let perms = resolve_collection_permissions([&editor], "products");
/// assert_eq!(perms, Permissions::new(true, true, true, false));
/// ```
pub fn resolve_collection_permissions<'a, I>(roles: I, path: &str) -> Permissions
where
    I: IntoIterator<Item = &'a Role>,
{
    roles
        .into_iter()
        .map(|role| resolve_collection_role(role, path))
        .fold(Permissions::none(), Permissions::merge)
}

/// Collection editor capabilities on one collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEditorPermissions {
    /// Can create new collections
    pub create_collections: bool,
    /// Can edit this collection's schema
    pub edit_collections: bool,
    /// Can delete this collection
    pub delete_collections: bool,
}

impl CollectionEditorPermissions {
    fn all() -> Self {
        Self {
            create_collections: true,
            edit_collections: true,
            delete_collections: true,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            create_collections: self.create_collections || other.create_collections,
            edit_collections: self.edit_collections || other.edit_collections,
            delete_collections: self.delete_collections || other.delete_collections,
        }
    }
}

/// Collection editor capabilities of a set of roles on one collection.
///
/// # Arguments
///
/// * `roles` - Roles held by the acting user
/// * `owner_id` - Owner recorded on the collection, if any
/// * `user_id` - Acting user id, if known
pub fn resolve_collection_editor_permissions<'a, I>(
    roles: I,
    owner_id: Option<&str>,
    user_id: Option<&str>,
) -> CollectionEditorPermissions
where
    I: IntoIterator<Item = &'a Role>,
{
    roles
        .into_iter()
        .map(|role| {
            if role.is_admin {
                return CollectionEditorPermissions::all();
            }
            match &role.config {
                Some(config) => CollectionEditorPermissions {
                    create_collections: config.create_collections,
                    edit_collections: config.edit_collections.allows(owner_id, user_id),
                    delete_collections: config.delete_collections.allows(owner_id, user_id),
                },
                None => CollectionEditorPermissions::default(),
            }
        })
        .fold(
            CollectionEditorPermissions::default(),
            CollectionEditorPermissions::merge,
        )
}

/// Resolves permissions against a fixed role table.
///
/// The table is supplied by the caller rather than read from global state,
/// so one resolver per project or tenant can be shared across threads.
///
/// # Example
///
/// ```
/// use firecms_rbac::{PermissionResolver, Permissions, RoleTable};
///
/// let resolver = PermissionResolver::new(RoleTable::default());
///
/// let admin = resolver.resolve_for_user(Some(["admin"]), "products");
/// assert_eq!(admin, Permissions::all());
///
/// let anonymous = resolver.resolve_for_user(None::<&[&str]>, "products");
/// assert_eq!(anonymous, Permissions::none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    table: RoleTable,
}

impl PermissionResolver {
    /// Create a resolver over a role table.
    pub fn new(table: RoleTable) -> Self {
        Self { table }
    }

    /// The role table this resolver uses.
    pub fn table(&self) -> &RoleTable {
        &self.table
    }

    /// Roles held by a user, in first-appearance order.
    pub fn user_roles<I, S>(&self, role_ids: I) -> Vec<&Role>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        get_user_roles(&self.table, role_ids)
    }

    /// Effective permissions of a user on a stripped collection path.
    ///
    /// `None` means the identity carries no role information at all and
    /// resolves to no permissions.
    pub fn resolve_for_user<I, S>(&self, role_ids: Option<I>, path: &str) -> Permissions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(role_ids) = role_ids else {
            tracing::debug!(path = %path, "No roles on identity, denying access");
            return Permissions::none();
        };
        let roles = self.user_roles(role_ids);
        let permissions = resolve_collection_permissions(roles.iter().copied(), path);
        tracing::debug!(
            path = %path,
            roles = roles.len(),
            read = permissions.read,
            create = permissions.create,
            edit = permissions.edit,
            delete = permissions.delete,
            "Resolved collection permissions"
        );
        permissions
    }

    /// Collection editor capabilities of a user on one collection.
    pub fn resolve_editor_for_user<I, S>(
        &self,
        role_ids: Option<I>,
        owner_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CollectionEditorPermissions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match role_ids {
            Some(ids) => resolve_collection_editor_permissions(
                self.user_roles(ids).into_iter(),
                owner_id,
                user_id,
            ),
            None => CollectionEditorPermissions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{EditorScope, RoleConfig};

    fn editor() -> Role {
        Role::new("editor", "Editor")
            .with_default_permissions(Permissions::new(true, true, true, false))
    }

    #[test]
    fn test_empty_roles_resolve_to_none() {
        let roles: Vec<Role> = Vec::new();
        assert_eq!(
            resolve_collection_permissions(roles.iter(), "products"),
            Permissions::none()
        );
    }

    #[test]
    fn test_admin_gets_everything() {
        let admin = Role::admin("admin", "Admin");
        for path in ["products", "products/locales", ""] {
            assert_eq!(resolve_collection_role(&admin, path), Permissions::all());
        }
    }

    #[test]
    fn test_admin_cannot_be_narrowed() {
        let admin = Role::admin("admin", "Admin")
            .with_collection_permissions("products", Permissions::none());
        assert_eq!(resolve_collection_role(&admin, "products"), Permissions::all());
    }

    #[test]
    fn test_editor_defaults() {
        assert_eq!(
            resolve_collection_permissions([&editor()], "products"),
            Permissions::new(true, true, true, false)
        );
    }

    #[test]
    fn test_path_entry_takes_precedence_over_defaults() {
        let role = editor().with_collection_permissions(
            "orders",
            Permissions::new(true, false, false, false),
        );
        assert_eq!(
            resolve_collection_role(&role, "orders"),
            Permissions::new(true, false, false, false)
        );
        assert_eq!(
            resolve_collection_role(&role, "products"),
            Permissions::new(true, true, true, false)
        );
    }

    #[test]
    fn test_unknown_path_falls_through_to_base() {
        let role = Role::new("auditor", "Auditor")
            .with_collection_permissions("logs", Permissions::new(true, false, false, false));
        assert_eq!(resolve_collection_role(&role, "users"), Permissions::none());
    }

    #[test]
    fn test_any_role_grants() {
        let reader = Role::new("reader", "Reader")
            .with_default_permissions(Permissions::new(true, false, false, false));
        let deleter = Role::new("deleter", "Deleter")
            .with_collection_permissions("products", Permissions::new(false, false, false, true));
        assert_eq!(
            resolve_collection_permissions([&reader, &deleter], "products"),
            Permissions::new(true, false, false, true)
        );
    }

    #[test]
    fn test_adding_roles_is_monotonic() {
        let candidates = vec![
            editor(),
            Role::admin("admin", "Admin"),
            Role::new("none", "None"),
            Role::new("deleter", "Deleter").with_collection_permissions(
                "products",
                Permissions::new(false, false, false, true),
            ),
        ];
        let mut held: Vec<&Role> = Vec::new();
        let mut previous = resolve_collection_permissions(held.iter().copied(), "products");
        for role in &candidates {
            held.push(role);
            let current = resolve_collection_permissions(held.iter().copied(), "products");
            assert!(current.covers(&previous));
            previous = current;
        }
    }

    #[test]
    fn test_resolver_ignores_unknown_role_ids() {
        let resolver = PermissionResolver::default();
        assert_eq!(
            resolver.resolve_for_user(Some(["ghost"]), "products"),
            Permissions::none()
        );
        assert_eq!(
            resolver.resolve_for_user(Some(["editor", "editor"]), "products"),
            Permissions::new(true, true, true, false)
        );
    }

    #[test]
    fn test_editor_permissions_own_scope() {
        let role = Role::new("author", "Author").with_config(RoleConfig {
            create_collections: true,
            edit_collections: EditorScope::Own,
            delete_collections: EditorScope::Denied,
        });
        let own = resolve_collection_editor_permissions([&role], Some("u1"), Some("u1"));
        assert_eq!(
            own,
            CollectionEditorPermissions {
                create_collections: true,
                edit_collections: true,
                delete_collections: false,
            }
        );
        let foreign = resolve_collection_editor_permissions([&role], Some("u2"), Some("u1"));
        assert!(!foreign.edit_collections);
        assert!(foreign.create_collections);
    }

    #[test]
    fn test_editor_permissions_admin_and_missing_config() {
        let admin = Role::admin("admin", "Admin");
        let plain = Role::new("plain", "Plain");
        assert_eq!(
            resolve_collection_editor_permissions([&admin], None, None),
            CollectionEditorPermissions::all()
        );
        assert_eq!(
            resolve_collection_editor_permissions([&plain], None, None),
            CollectionEditorPermissions::default()
        );
        let resolver = PermissionResolver::default();
        assert_eq!(
            resolver.resolve_editor_for_user(None::<&[&str]>, None, None),
            CollectionEditorPermissions::default()
        );
    }
}
