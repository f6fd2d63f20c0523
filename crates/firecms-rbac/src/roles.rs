//! Role definitions and role tables
//!
//! A role is a named bundle of collection permissions. Admin roles start from
//! full access; other roles start from nothing and gain capabilities through
//! `defaultPermissions` or per-path `collectionPermissions` entries.
//!
//! Role tables are explicit values handed to the resolver, so different
//! sessions or tenants can work with different tables at the same time.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::permissions::Permissions;

/// Errors raised while loading a role table.
#[derive(Debug, Error)]
pub enum RoleTableError {
    /// The table could not be parsed.
    #[error("Invalid role table: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two roles share the same id.
    #[error("Duplicate role id: {0}")]
    DuplicateRole(String),
}

/// A role as stored in the roles collection.
///
/// # Examples
///
/// ```
/// use firecms_rbac::{Permissions, Role};
///
/// let role = Role::new("editor", "Editor")
///     .with_default_permissions(Permissions::new(true, true, true, false));
/// assert!(!role.is_admin);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role id, referenced from user records
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Admin roles get every permission on every collection
    #[serde(default)]
    pub is_admin: bool,

    /// Permissions applied to collections without a specific entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_permissions: Option<Permissions>,

    /// Permissions keyed by stripped collection path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_permissions: Option<HashMap<String, Permissions>>,

    /// Collection editor capabilities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RoleConfig>,
}

impl Role {
    /// Creates a non-admin role with no permissions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_admin: false,
            default_permissions: None,
            collection_permissions: None,
            config: None,
        }
    }

    /// Creates an admin role.
    pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::new(id, name)
        }
    }

    /// Set the permissions used when no path-specific entry matches.
    pub fn with_default_permissions(mut self, permissions: Permissions) -> Self {
        self.default_permissions = Some(permissions);
        self
    }

    /// Add a permission entry for one stripped collection path.
    pub fn with_collection_permissions(
        mut self,
        path: impl Into<String>,
        permissions: Permissions,
    ) -> Self {
        self.collection_permissions
            .get_or_insert_with(HashMap::new)
            .insert(path.into(), permissions);
        self
    }

    /// Set the collection editor capabilities.
    pub fn with_config(mut self, config: RoleConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Permission entry declared for exactly `path`, if any.
    pub fn permissions_for_path(&self, path: &str) -> Option<Permissions> {
        self.collection_permissions
            .as_ref()
            .and_then(|entries| entries.get(path))
            .copied()
    }

    /// Base permissions derived from the admin flag.
    pub fn base_permissions(&self) -> Permissions {
        Permissions::uniform(self.is_admin)
    }
}

/// Scope of a collection editor capability.
///
/// Stored either as a boolean or as the string `"own"`, which limits the
/// capability to collections the acting user created.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "ScopeRepr", into = "ScopeRepr")]
pub enum EditorScope {
    /// Not granted
    #[default]
    Denied,

    /// Granted on collections owned by the acting user
    Own,

    /// Granted on every collection
    All,
}

impl EditorScope {
    /// Check if this scope grants the capability on a collection.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Owner of the collection, if recorded
    /// * `user_id` - Acting user, if known
    pub fn allows(&self, owner_id: Option<&str>, user_id: Option<&str>) -> bool {
        match self {
            EditorScope::Denied => false,
            EditorScope::All => true,
            EditorScope::Own => matches!((owner_id, user_id), (Some(o), Some(u)) if o == u),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScopeRepr {
    Flag(bool),
    Keyword(String),
}

impl TryFrom<ScopeRepr> for EditorScope {
    type Error = String;

    fn try_from(repr: ScopeRepr) -> Result<Self, Self::Error> {
        match repr {
            ScopeRepr::Flag(true) => Ok(EditorScope::All),
            ScopeRepr::Flag(false) => Ok(EditorScope::Denied),
            ScopeRepr::Keyword(k) if k == "own" => Ok(EditorScope::Own),
            ScopeRepr::Keyword(k) => Err(format!("unknown editor scope: {k}")),
        }
    }
}

impl From<EditorScope> for ScopeRepr {
    fn from(scope: EditorScope) -> Self {
        match scope {
            EditorScope::Denied => ScopeRepr::Flag(false),
            EditorScope::All => ScopeRepr::Flag(true),
            EditorScope::Own => ScopeRepr::Keyword("own".to_string()),
        }
    }
}

/// Collection editor capabilities attached to a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    /// Can create new collections
    #[serde(default)]
    pub create_collections: bool,

    /// Can edit collection schemas
    #[serde(default)]
    pub edit_collections: EditorScope,

    /// Can delete collections
    #[serde(default)]
    pub delete_collections: EditorScope,
}

/// The set of roles known to a project.
///
/// # Examples
///
/// ```
/// use firecms_rbac::RoleTable;
///
/// let table = RoleTable::default();
/// assert!(table.get("admin").is_some());
/// assert!(table.get("editor").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    roles: Vec<Role>,
}

impl RoleTable {
    /// Build a table, rejecting duplicate ids.
    pub fn new(roles: Vec<Role>) -> Result<Self, RoleTableError> {
        let mut seen = HashSet::new();
        for role in &roles {
            if !seen.insert(role.id.as_str()) {
                return Err(RoleTableError::DuplicateRole(role.id.clone()));
            }
        }
        Ok(Self { roles })
    }

    /// Parse a JSON array of roles.
    pub fn from_json(json: &str) -> Result<Self, RoleTableError> {
        let roles: Vec<Role> = serde_json::from_str(json)?;
        Self::new(roles)
    }

    /// The built-in `admin` and `editor` roles.
    pub fn default_roles() -> Vec<Role> {
        vec![
            Role::admin("admin", "Admin"),
            Role::new("editor", "Editor")
                .with_default_permissions(Permissions::new(true, true, true, false)),
        ]
    }

    /// Look up a role by id.
    pub fn get(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// All roles in declaration order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            roles: Self::default_roles(),
        }
    }
}

/// Map a user's role ids to role definitions.
///
/// Unknown ids are dropped and repeated ids yield the role once, in the
/// order of first appearance.
pub fn get_user_roles<'a, I, S>(table: &'a RoleTable, role_ids: I) -> Vec<&'a Role>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut roles = Vec::new();
    for id in role_ids {
        let id = id.as_ref();
        match table.get(id) {
            Some(role) => {
                if seen.insert(role.id.as_str()) {
                    roles.push(role);
                }
            }
            None => tracing::warn!(role_id = %id, "Ignoring unknown role id"),
        }
    }
    roles
}
