//! # FireCMS RBAC (Role-Based Access Control)
//!
//! This crate resolves what a user may do with a FireCMS collection from the
//! roles they hold.
//!
//! ## Overview
//!
//! The firecms-rbac crate handles:
//! - **Permissions**: read/create/edit/delete flags and their OR merge
//! - **Roles**: admin flag, default permissions, per-path overrides
//! - **Role Tables**: the roles known to a project, passed in explicitly
//! - **Resolution**: effective permissions of a user on a collection path
//!
//! ## Resolution Rules
//!
//! ```text
//! role permissions = base(isAdmin) OR (collectionPermissions[path] | defaultPermissions)
//! user permissions = OR over every role the user holds
//! no roles         = nothing granted
//! ```
//!
//! Paths are stripped collection paths (entity ids removed), e.g.
//! `products/locales` for `products/p1/locales`.
//!
//! ## Usage
//!
//! ```rust
//! use firecms_rbac::{PermissionResolver, Permissions, Role, RoleTable};
//!
//! let table = RoleTable::new(vec![
//!     Role::admin("admin", "Admin"),
//!     Role::new("editor", "Editor")
//!         .with_default_permissions(Permissions::new(true, true, true, false))
//!         .with_collection_permissions("orders", Permissions::new(true, false, false, false)),
//! ])
//! .unwrap();
//!
//! let resolver = PermissionResolver::new(table);
//! let perms = resolver.resolve_for_user(Some(["editor"]), "orders");
//! assert_eq!(perms, Permissions::new(true, false, false, false));
//! ```

pub mod permissions;
pub mod resolver;
pub mod roles;

// Re-export main types for convenience
pub use permissions::{merge_permissions, Permissions};
pub use resolver::{
    resolve_collection_editor_permissions, resolve_collection_permissions,
    resolve_collection_role, CollectionEditorPermissions, PermissionResolver,
};
pub use roles::{get_user_roles, EditorScope, Role, RoleConfig, RoleTable, RoleTableError};
