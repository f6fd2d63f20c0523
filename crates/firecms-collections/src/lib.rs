//! # FireCMS Collections
//!
//! This crate stores and restores FireCMS collection definitions.
//!
//! ## Overview
//!
//! The firecms-collections crate handles:
//! - **Paths**: stripping entity ids and composing composite collection ids
//! - **Values**: dynamic document values, including unset and delete states
//! - **Properties**: typed property definitions and their display order
//! - **Codec**: rebuilding collection trees from stored documents and
//!   preparing collections for storage
//! - **Access**: resolving a user's permissions on a collection path
//!
//! ## Storage Layout
//!
//! ```text
//! products                    ─→ products
//! products::locales           ─→   └─ locales
//! products::locales::regions  ─→        └─ regions
//! users                       ─→ users
//! ```
//!
//! Each collection is one document keyed by its composite id. Subcollections
//! are never stored inside their parent.
//!
//! ## Usage
//!
//! ```rust
//! use firecms_collections::{CollectionTreeCodec, EntityCollection};
//!
//! let codec = CollectionTreeCodec::default();
//! let products = EntityCollection::new("products", "Products")
//!     .with_subcollection(EntityCollection::new("locales", "Locales"));
//!
//! let records = codec.flatten(&products, &[]).unwrap();
//! let docs: Vec<_> = records.iter().map(|(id, r)| r.to_document(id.as_str())).collect();
//!
//! let tree = codec.build_tree(&docs).unwrap();
//! assert_eq!(tree[0].subcollections[0].id, "products::locales");
//! ```
//!
//! ## Configuration
//!
//! - `FIRECMS_COLLECTION_PATH_SEPARATOR`: composite id separator (default `::`)

pub mod access;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod paths;
pub mod property;
pub mod value;

// Re-export main types for convenience
pub use access::{resolve_collection_access, resolve_editor_access, CmsUser};
pub use codec::{
    doc_to_collection, prepare_collection_for_persistence, CollectionTreeCodec,
    PersistableRecord, StoredDocument, RUNTIME_ONLY_FIELDS,
};
pub use collection::{
    apply_permissions, AdditionalField, CollectionPermissions, EntityCollection,
    EntityCustomView, PersistedCollection,
};
pub use config::{CodecConfig, ConfigError};
pub use error::{CollectionError, CollectionResult};
pub use paths::{
    build_collection_path, segments_to_stripped_path, strip_collection_path,
    COLLECTION_PATH_SEPARATOR,
};
pub use property::{
    sort_properties, DataType, Properties, PropertiesOrBuilders, Property, PropertyOrBuilder,
};
pub use value::{FieldValue, FunctionRef};
