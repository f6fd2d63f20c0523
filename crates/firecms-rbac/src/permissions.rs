//! # Permissions
//!
//! The four CRUD capabilities a user can hold on a collection, and the
//! field-wise OR merge used to combine them.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Read/create/edit/delete capabilities on a collection.
///
/// `Permissions` is a plain value: every resolution produces a fresh one and
/// nothing mutates a shared instance.
///
/// # Example
///
/// ```
/// use firecms_rbac::Permissions;
///
/// let viewer = Permissions::new(true, false, false, false);
/// let writer = Permissions::new(false, true, true, false);
///
/// let merged = viewer.merge(writer);
/// assert_eq!(merged, Permissions::new(true, true, true, false));
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permissions {
    /// Entities of the collection can be listed and viewed.
    #[serde(default)]
    pub read: bool,

    /// New entities can be created.
    #[serde(default)]
    pub create: bool,

    /// Existing entities can be modified.
    #[serde(default)]
    pub edit: bool,

    /// Entities can be deleted.
    #[serde(default)]
    pub delete: bool,
}

impl Permissions {
    /// Create a permission set from its four flags.
    pub const fn new(read: bool, create: bool, edit: bool, delete: bool) -> Self {
        Self {
            read,
            create,
            edit,
            delete,
        }
    }

    /// No capability granted. This is the fail-closed default.
    pub const fn none() -> Self {
        Self::new(false, false, false, false)
    }

    /// Every capability granted.
    pub const fn all() -> Self {
        Self::new(true, true, true, true)
    }

    /// All four flags set to `value`.
    ///
    /// Used to derive the base permissions of a role from its admin flag.
    pub const fn uniform(value: bool) -> Self {
        Self::new(value, value, value, value)
    }

    /// Field-wise logical OR of two permission sets.
    ///
    /// The merge is commutative, associative and idempotent, so the order in
    /// which roles are folded never changes the result.
    ///
    /// # Example
    ///
    /// ```
    /// use firecms_rbac::Permissions;
    ///
    /// let a = Permissions::new(true, false, false, false);
    /// let b = Permissions::new(false, false, false, true);
    /// assert_eq!(a.merge(b), b.merge(a));
    /// assert_eq!(a.merge(a), a);
    /// ```
    pub const fn merge(self, other: Permissions) -> Self {
        Self {
            read: self.read || other.read,
            create: self.create || other.create,
            edit: self.edit || other.edit,
            delete: self.delete || other.delete,
        }
    }

    /// Check if no capability is granted.
    pub const fn is_none(&self) -> bool {
        !(self.read || self.create || self.edit || self.delete)
    }

    /// Check if every capability granted by `other` is also granted here.
    pub const fn covers(&self, other: &Permissions) -> bool {
        (self.read || !other.read)
            && (self.create || !other.create)
            && (self.edit || !other.edit)
            && (self.delete || !other.delete)
    }
}

/// Free-function form of [`Permissions::merge`], convenient as a fold step.
pub fn merge_permissions(a: Permissions, b: Permissions) -> Permissions {
    a.merge(b)
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        self.merge(rhs)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Permissions) {
        *self = self.merge(rhs);
    }
}
