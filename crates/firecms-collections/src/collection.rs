//! Collection domain models
//!
//! [`EntityCollection`] is the in-memory definition the UI works with,
//! including runtime-only parts such as callbacks and custom views.
//! [`PersistedCollection`] is what the collection editor stores: one
//! document per collection, keyed by composite path id, with subcollections
//! reassembled after loading.

use firecms_rbac::Permissions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::property::{Properties, PropertiesOrBuilders, PropertyOrBuilder};
use crate::value::{FieldValue, FunctionRef};

/// Where a collection's permissions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionPermissions {
    /// Fixed permissions for every user
    Fixed(Permissions),

    /// Function of the user and collection, evaluated in the UI layer
    Builder(FunctionRef),
}

/// A custom view displayed next to an entity form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCustomView {
    pub path: String,
    pub name: String,
    pub builder: FunctionRef,
}

/// A computed column shown in the collection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalField {
    pub key: String,
    pub name: String,
    pub builder: FunctionRef,
}

/// In-memory collection definition.
///
/// # Examples
///
/// ```
/// use firecms_collections::collection::EntityCollection;
/// use firecms_collections::property::{DataType, Property};
///
/// let products = EntityCollection::new("products", "Products")
///     .with_property("name", Property::new(DataType::String).with_name("Name"));
/// assert_eq!(products.properties.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollection {
    /// Relative path of the collection
    pub path: String,

    /// Alternative path used in URLs
    pub alias: Option<String>,

    pub name: String,
    pub singular_name: Option<String>,
    pub description: Option<String>,

    /// Navigation group
    pub group: Option<String>,
    pub icon: Option<String>,

    /// User who created the collection in the editor
    pub owner_id: Option<String>,

    pub properties: PropertiesOrBuilders,

    /// Explicit order of `properties`
    pub properties_order: Option<Vec<String>>,

    /// Other stored options (`textSearchEnabled`, `defaultSize`, ...)
    pub extra: IndexMap<String, FieldValue>,

    /// Nested collections, stored as sibling documents
    pub subcollections: Vec<EntityCollection>,

    // Runtime-only parts, never persisted
    pub permissions: Option<CollectionPermissions>,
    pub views: Vec<EntityCustomView>,
    pub additional_fields: Vec<AdditionalField>,
    pub callbacks: Option<FunctionRef>,
    pub actions: Vec<FunctionRef>,
    pub selection_controller: Option<FunctionRef>,
}

impl EntityCollection {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_property(
        mut self,
        key: impl Into<String>,
        property: impl Into<PropertyOrBuilder>,
    ) -> Self {
        self.properties.insert(key.into(), property.into());
        self
    }

    pub fn with_subcollection(mut self, subcollection: EntityCollection) -> Self {
        self.subcollections.push(subcollection);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A collection as stored by the collection editor.
///
/// `id` and `subcollections` are not stored fields: the id is the document
/// key and subcollections are separate documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCollection {
    /// Composite path id of the document
    #[serde(skip)]
    pub id: String,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_order: Option<Vec<String>>,

    /// Other stored options
    #[serde(flatten)]
    pub extra: IndexMap<String, FieldValue>,

    /// Child collections, filled in by tree reconstruction
    #[serde(skip)]
    pub subcollections: Vec<PersistedCollection>,

    /// Runtime permissions attached after loading
    #[serde(skip)]
    pub permissions: Option<CollectionPermissions>,
}

impl PersistedCollection {
    /// Find a direct subcollection by path.
    pub fn subcollection(&self, path: &str) -> Option<&PersistedCollection> {
        self.subcollections.iter().find(|c| c.path == path)
    }

    /// Number of collections in this subtree, including this one.
    pub fn tree_size(&self) -> usize {
        1 + self
            .subcollections
            .iter()
            .map(PersistedCollection::tree_size)
            .sum::<usize>()
    }
}

impl From<PersistedCollection> for EntityCollection {
    fn from(persisted: PersistedCollection) -> Self {
        Self {
            path: persisted.path,
            alias: persisted.alias,
            name: persisted.name,
            singular_name: persisted.singular_name,
            description: persisted.description,
            group: persisted.group,
            icon: persisted.icon,
            owner_id: persisted.owner_id,
            properties: persisted
                .properties
                .into_iter()
                .map(|(key, property)| (key, PropertyOrBuilder::Property(property)))
                .collect(),
            properties_order: persisted.properties_order,
            extra: persisted.extra,
            subcollections: persisted
                .subcollections
                .into_iter()
                .map(EntityCollection::from)
                .collect(),
            permissions: persisted.permissions,
            ..Default::default()
        }
    }
}

/// Attach the same runtime permissions to every collection of a tree.
pub fn apply_permissions(
    collections: Vec<PersistedCollection>,
    permissions: Option<CollectionPermissions>,
) -> Vec<PersistedCollection> {
    collections
        .into_iter()
        .map(|mut collection| {
            let subcollections = std::mem::take(&mut collection.subcollections);
            collection.subcollections = apply_permissions(subcollections, permissions.clone());
            collection.permissions = permissions.clone();
            collection
        })
        .collect()
}
