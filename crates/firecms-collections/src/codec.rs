//! # Collection tree codec
//!
//! Collections are stored one document per collection. A document's id is
//! the composite path id of the collection (`products::locales` for the
//! `locales` subcollection of `products`), so the tree structure lives in
//! the ids rather than in the documents.
//!
//! ## Reading
//!
//! ```text
//! [products, products::locales, products::locales::regions, users]
//!        │ decode each document, order properties
//!        │ attach every child to its direct parent, deepest ids first
//!        ▼
//! products ─┬─ locales ── regions
//! users
//! ```
//!
//! ## Writing
//!
//! Builders, functions and runtime-only fields are stripped, unset values
//! become delete sentinels, and each subcollection becomes its own record.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::collection::{EntityCollection, PersistedCollection};
use crate::config::{CodecConfig, ConfigError};
use crate::error::{CollectionError, CollectionResult};
use crate::paths::{build_collection_path, id_depth, parent_id, strip_collection_path};
use crate::property::{
    order_to_field_value, properties_to_field_value, remove_non_editable_properties,
    sort_properties,
};
use crate::value::{remove_functions_in_map, set_undefined_to_delete_in_map, FieldValue};

/// Fields that only exist at runtime and are never written to the store.
pub const RUNTIME_ONLY_FIELDS: [&str; 7] = [
    "permissions",
    "views",
    "additionalFields",
    "callbacks",
    "Actions",
    "selectionController",
    "subcollections",
];

/// A collection document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Composite path id
    pub id: String,

    /// Document fields; `None` when the document has no payload
    pub data: Option<Map<String, Value>>,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data: Some(data),
        }
    }

    /// A document that exists without data.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: None,
        }
    }
}

/// A write payload for one collection document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistableRecord {
    fields: IndexMap<String, FieldValue>,
}

impl PersistableRecord {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    pub fn into_fields(self) -> IndexMap<String, FieldValue> {
        self.fields
    }

    /// Check if any value in the payload is still `Undefined`.
    pub fn contains_undefined(&self) -> bool {
        self.fields.values().any(FieldValue::contains_undefined)
    }

    /// The document the store holds after writing this record in full.
    pub fn to_document(&self, id: impl Into<String>) -> StoredDocument {
        let data = self
            .fields
            .iter()
            .filter_map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
            .collect();
        StoredDocument::new(id, data)
    }
}

/// Decode one stored document into a collection.
///
/// Properties are ordered by the stored `propertiesOrder`.
pub fn doc_to_collection(doc: &StoredDocument) -> CollectionResult<PersistedCollection> {
    let data = doc
        .data
        .as_ref()
        .ok_or_else(|| CollectionError::DataIntegrity { id: doc.id.clone() })?;

    let mut collection: PersistedCollection = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|source| CollectionError::Malformed {
            id: doc.id.clone(),
            source,
        })?;
    collection.id = doc.id.clone();

    let properties = std::mem::take(&mut collection.properties);
    collection.properties = sort_properties(properties, collection.properties_order.as_deref());
    Ok(collection)
}

/// Prepare a collection for storage.
///
/// Builder properties, function values and runtime-only fields are dropped,
/// unset values become [`FieldValue::Delete`] and an empty alias is removed.
/// Subcollections are not included; see [`CollectionTreeCodec::flatten`].
pub fn prepare_collection_for_persistence(collection: &EntityCollection) -> PersistableRecord {
    let properties = remove_non_editable_properties(&collection.properties);

    let mut fields = IndexMap::new();
    fields.insert("path".to_string(), FieldValue::String(collection.path.clone()));
    fields.insert("alias".to_string(), collection.alias.clone().into());
    fields.insert("name".to_string(), FieldValue::String(collection.name.clone()));
    fields.insert(
        "singularName".to_string(),
        collection.singular_name.clone().into(),
    );
    fields.insert("description".to_string(), collection.description.clone().into());
    fields.insert("group".to_string(), collection.group.clone().into());
    fields.insert("icon".to_string(), collection.icon.clone().into());
    if let Some(owner_id) = &collection.owner_id {
        fields.insert("ownerId".to_string(), FieldValue::String(owner_id.clone()));
    }
    fields.insert("properties".to_string(), properties_to_field_value(&properties));
    fields.insert(
        "propertiesOrder".to_string(),
        collection
            .properties_order
            .as_deref()
            .map(order_to_field_value)
            .unwrap_or(FieldValue::Undefined),
    );
    for (key, value) in &collection.extra {
        fields.entry(key.clone()).or_insert_with(|| value.clone());
    }

    let mut fields = set_undefined_to_delete_in_map(remove_functions_in_map(fields));

    for key in RUNTIME_ONLY_FIELDS {
        if fields.shift_remove(key).is_some() {
            tracing::debug!(field = %key, path = %collection.path, "Dropped runtime-only field");
        }
    }
    if matches!(fields.get("alias"), Some(FieldValue::String(alias)) if alias.is_empty()) {
        fields.shift_remove("alias");
    }

    PersistableRecord { fields }
}

/// Reads and writes collection trees using one separator.
///
/// # Example
///
/// ```
/// use firecms_collections::codec::{CollectionTreeCodec, StoredDocument};
/// use serde_json::json;
///
/// let codec = CollectionTreeCodec::default();
/// let doc = |id: &str, path: &str| {
///     let data = json!({"path": path, "name": path});
///     StoredDocument::new(id, data.as_object().unwrap().clone())
/// };
///
/// let tree = codec
///     .build_tree(&[doc("products", "products"), doc("products::locales", "locales")])
///     .unwrap();
/// assert_eq!(tree.len(), 1);
/// assert_eq!(tree[0].subcollections[0].path, "locales");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectionTreeCodec {
    config: CodecConfig,
}

impl CollectionTreeCodec {
    /// Build a codec, rejecting configurations it cannot work with.
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build a codec from environment configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(CodecConfig::from_env())
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn separator(&self) -> &str {
        &self.config.separator
    }

    /// Composite id for a collection path under the given ancestors.
    pub fn build_path(&self, path: &str, parent_segments: &[&str]) -> CollectionResult<String> {
        build_collection_path(path, parent_segments, self.separator())
    }

    /// Reassemble the collection tree from stored documents.
    ///
    /// Children are attached to their direct parent, deepest ids first, so
    /// hierarchies of any depth are rebuilt whatever the input order.
    /// Siblings keep their input order. A collection whose parent document
    /// is missing is returned at the top level.
    ///
    /// # Errors
    ///
    /// Fails on the first document without data or with an invalid shape;
    /// no partial tree is returned.
    pub fn build_tree(
        &self,
        docs: &[StoredDocument],
    ) -> CollectionResult<Vec<PersistedCollection>> {
        let separator = self.separator();

        let mut collections: IndexMap<String, PersistedCollection> =
            IndexMap::with_capacity(docs.len());
        for doc in docs {
            let collection = doc_to_collection(doc)?;
            if collections.insert(doc.id.clone(), collection).is_some() {
                tracing::warn!(id = %doc.id, "Duplicate collection id, keeping the last document");
            }
        }

        let mut child_ids: Vec<(usize, String)> = collections
            .keys()
            .filter(|id| id.contains(separator))
            .map(|id| (id_depth(id, separator), id.clone()))
            .collect();
        child_ids.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, id) in child_ids {
            let Some(parent) = parent_id(&id, separator) else {
                continue;
            };
            if !collections.contains_key(parent) {
                tracing::warn!(
                    id = %id,
                    parent = %parent,
                    "Parent collection not found, keeping at top level"
                );
                continue;
            }
            if let Some(child) = collections.shift_remove(&id) {
                if let Some(parent) = collections.get_mut(parent) {
                    parent.subcollections.push(child);
                }
            }
        }

        tracing::debug!(
            documents = docs.len(),
            roots = collections.len(),
            "Assembled collection tree"
        );
        Ok(collections.into_values().collect())
    }

    /// Composite id and payload for saving one collection.
    ///
    /// # Errors
    ///
    /// `Configuration` if the collection has no path, `InvalidPathSegment`
    /// if the collection's own path or an ancestor segment contains the
    /// separator.
    pub fn prepare_for_save(
        &self,
        collection: &EntityCollection,
        parent_segments: &[&str],
    ) -> CollectionResult<(String, PersistableRecord)> {
        let stripped = strip_collection_path(&collection.path);
        if stripped.is_empty() {
            return Err(CollectionError::Configuration(format!(
                "collection {:?} has no path to persist under",
                collection.name
            )));
        }
        // A collection path is a single segment, never a composite id.
        if stripped.contains(self.separator()) {
            return Err(CollectionError::InvalidPathSegment {
                segment: collection.path.clone(),
                separator: self.separator().to_string(),
            });
        }
        let id = self.build_path(&collection.path, parent_segments)?;
        Ok((id, prepare_collection_for_persistence(collection)))
    }

    /// One record per collection of a subtree, parents before children.
    pub fn flatten(
        &self,
        collection: &EntityCollection,
        parent_segments: &[&str],
    ) -> CollectionResult<Vec<(String, PersistableRecord)>> {
        let mut records = Vec::new();
        self.flatten_into(collection, parent_segments, &mut records)?;
        Ok(records)
    }

    fn flatten_into(
        &self,
        collection: &EntityCollection,
        parent_segments: &[&str],
        records: &mut Vec<(String, PersistableRecord)>,
    ) -> CollectionResult<()> {
        records.push(self.prepare_for_save(collection, parent_segments)?);

        let mut segments = parent_segments.to_vec();
        segments.push(&collection.path);
        for subcollection in &collection.subcollections {
            self.flatten_into(subcollection, &segments, records)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{AdditionalField, CollectionPermissions, EntityCustomView};
    use crate::property::{DataType, Property, PropertyOrBuilder};
    use crate::value::FunctionRef;
    use firecms_rbac::Permissions;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> StoredDocument {
        StoredDocument::new(id, data.as_object().cloned().unwrap_or_default())
    }

    fn named(id: &str) -> StoredDocument {
        let path = id.rsplit("::").next().unwrap_or(id);
        doc(id, json!({"path": path, "name": path}))
    }

    fn paths(collections: &[PersistedCollection]) -> Vec<&str> {
        collections.iter().map(|c| c.path.as_str()).collect()
    }

    #[test]
    fn test_doc_to_collection_orders_properties() {
        let collection = doc_to_collection(&doc(
            "products",
            json!({
                "path": "products",
                "name": "Products",
                "properties": {
                    "name": {"dataType": "string"},
                    "price": {"dataType": "number"},
                    "tags": {"dataType": "array", "of": {"dataType": "string"}}
                },
                "propertiesOrder": ["price", "name"]
            }),
        ))
        .unwrap();
        let keys: Vec<&str> = collection.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["price", "name", "tags"]);
        assert_eq!(collection.id, "products");
    }

    #[test]
    fn test_doc_without_data_fails() {
        let err = doc_to_collection(&StoredDocument::empty("products")).unwrap_err();
        assert!(matches!(err, CollectionError::DataIntegrity { ref id } if id == "products"));
    }

    #[test]
    fn test_malformed_doc_fails() {
        let err = doc_to_collection(&doc("products", json!({"name": "No path"}))).unwrap_err();
        assert!(matches!(err, CollectionError::Malformed { .. }));
    }

    #[test]
    fn test_build_tree_custom_separator() {
        let codec = CollectionTreeCodec::new(CodecConfig::with_separator("##")).unwrap();
        let tree = codec
            .build_tree(&[
                doc("a", json!({"path": "a", "name": "A"})),
                doc("a##b", json!({"path": "b", "name": "B"})),
            ])
            .unwrap();
        assert_eq!(paths(&tree), vec!["a"]);
        assert_eq!(paths(&tree[0].subcollections), vec!["b"]);
        assert_eq!(tree[0].subcollections[0].id, "a##b");
    }

    #[test]
    fn test_build_tree_three_levels_any_order() {
        let codec = CollectionTreeCodec::default();
        let orders = [
            vec!["a", "a::b", "a::b::c"],
            vec!["a::b::c", "a::b", "a"],
            vec!["a::b", "a", "a::b::c"],
        ];
        for order in orders {
            let docs: Vec<_> = order.iter().map(|id| named(id)).collect();
            let tree = codec.build_tree(&docs).unwrap();
            assert_eq!(paths(&tree), vec!["a"]);
            let b = tree[0].subcollection("b").unwrap();
            assert_eq!(paths(&b.subcollections), vec!["c"]);
            assert_eq!(tree[0].tree_size(), 3);
        }
    }

    #[test]
    fn test_build_tree_sibling_order_follows_input() {
        let codec = CollectionTreeCodec::default();
        let docs: Vec<_> = ["p", "p::z", "q", "p::a"].iter().map(|id| named(id)).collect();
        let tree = codec.build_tree(&docs).unwrap();
        assert_eq!(paths(&tree), vec!["p", "q"]);
        assert_eq!(paths(&tree[0].subcollections), vec!["z", "a"]);
    }

    #[test]
    fn test_build_tree_orphan_stays_at_top_level() {
        let codec = CollectionTreeCodec::default();
        let docs: Vec<_> = ["x::y", "a"].iter().map(|id| named(id)).collect();
        let tree = codec.build_tree(&docs).unwrap();
        assert_eq!(paths(&tree), vec!["y", "a"]);
    }

    #[test]
    fn test_build_tree_aborts_on_missing_payload() {
        let codec = CollectionTreeCodec::default();
        let result = codec.build_tree(&[named("a"), StoredDocument::empty("a::b")]);
        assert!(matches!(result, Err(CollectionError::DataIntegrity { .. })));
    }

    #[test]
    fn test_prepare_strips_runtime_and_builders() {
        let mut collection = EntityCollection::new("products", "Products")
            .with_alias("")
            .with_property("name", Property::new(DataType::String))
            .with_property("x", PropertyOrBuilder::Builder(FunctionRef::new("xBuilder")))
            .with_extra("callbacks", FieldValue::Map(IndexMap::new()))
            .with_extra("onPreSave", FieldValue::Function(FunctionRef::new("onPreSave")))
            .with_extra("textSearchEnabled", true);
        collection.callbacks = Some(FunctionRef::new("productCallbacks"));
        collection.permissions = Some(CollectionPermissions::Fixed(Permissions::all()));
        collection.views.push(EntityCustomView {
            path: "preview".to_string(),
            name: "Preview".to_string(),
            builder: FunctionRef::new("previewView"),
        });
        collection.additional_fields.push(AdditionalField {
            key: "full_name".to_string(),
            name: "Full name".to_string(),
            builder: FunctionRef::new("fullName"),
        });

        let record = prepare_collection_for_persistence(&collection);
        assert!(!record.contains_key("alias"));
        assert!(!record.contains_key("callbacks"));
        assert!(!record.contains_key("onPreSave"));
        for key in RUNTIME_ONLY_FIELDS {
            assert!(!record.contains_key(key));
        }
        let properties = record.get("properties").unwrap().as_map().unwrap();
        assert!(properties.contains_key("name"));
        assert!(!properties.contains_key("x"));
        assert_eq!(record.get("textSearchEnabled"), Some(&FieldValue::Bool(true)));
        assert!(!record.contains_undefined());
    }

    #[test]
    fn test_prepare_unset_fields_become_delete() {
        let collection = EntityCollection::new("products", "Products").with_property(
            "name",
            Property::new(DataType::String).with_config("validation", FieldValue::Undefined),
        );
        let record = prepare_collection_for_persistence(&collection);
        assert_eq!(record.get("description"), Some(&FieldValue::Delete));
        assert_eq!(record.get("alias"), Some(&FieldValue::Delete));
        assert_eq!(record.get("propertiesOrder"), Some(&FieldValue::Delete));
        let name = record.get("properties").unwrap().as_map().unwrap()["name"]
            .as_map()
            .unwrap();
        assert_eq!(name["validation"], FieldValue::Delete);
        for key in ["name", "description", "properties", "propertiesOrder", "of"] {
            assert_eq!(name[key], FieldValue::Delete, "{key} should be cleared");
        }
        assert_eq!(name["dataType"], FieldValue::from("string"));
    }

    #[test]
    fn test_prepare_keeps_non_empty_alias() {
        let collection = EntityCollection::new("products", "Products").with_alias("ppp");
        let record = prepare_collection_for_persistence(&collection);
        assert_eq!(record.get("alias"), Some(&FieldValue::from("ppp")));
    }

    #[test]
    fn test_prepare_for_save_requires_path() {
        let codec = CollectionTreeCodec::default();
        let err = codec
            .prepare_for_save(&EntityCollection::new("/", "Nameless"), &[])
            .unwrap_err();
        assert!(matches!(err, CollectionError::Configuration(_)));
    }

    #[test]
    fn test_flatten_produces_sibling_records() {
        let codec = CollectionTreeCodec::default();
        let tree = EntityCollection::new("products", "Products").with_subcollection(
            EntityCollection::new("locales", "Locales")
                .with_subcollection(EntityCollection::new("regions", "Regions")),
        );
        let records = codec.flatten(&tree, &[]).unwrap();
        let ids: Vec<&str> = records.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["products", "products::locales", "products::locales::regions"]);
        for (_, record) in &records {
            assert!(!record.contains_key("subcollections"));
        }
    }

    #[test]
    fn test_prepare_for_save_rejects_separator_in_own_path() {
        let codec = CollectionTreeCodec::default();
        let err = codec
            .prepare_for_save(&EntityCollection::new("a::b", "AB"), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::InvalidPathSegment { ref segment, .. } if segment == "a::b"
        ));

        let nested = EntityCollection::new("a", "A")
            .with_subcollection(EntityCollection::new("b::c", "BC"));
        assert!(codec.flatten(&nested, &[]).is_err());

        // Composite ids stay idempotent through build_path.
        assert_eq!(codec.build_path("a::b", &[]).unwrap(), "a::b");
    }

    #[test]
    fn test_codec_rejects_invalid_separator() {
        assert!(CollectionTreeCodec::new(CodecConfig::with_separator("")).is_err());
        assert!(CollectionTreeCodec::new(CodecConfig::with_separator("a/b")).is_err());
        assert!(CollectionTreeCodec::new(CodecConfig::with_separator("##")).is_ok());
    }

    #[test]
    fn test_to_document_omits_deleted_fields() {
        let record = prepare_collection_for_persistence(&EntityCollection::new("a", "A"));
        let stored = record.to_document("a");
        let data = stored.data.unwrap();
        assert!(!data.contains_key("description"));
        assert_eq!(data["path"], json!("a"));
    }
}
