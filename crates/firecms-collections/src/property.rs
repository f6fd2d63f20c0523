//! Property definitions
//!
//! A property describes one field of a collection's entities. Properties
//! of a collection may also be builders: functions of the current form
//! values, resolved in the UI layer. Builders are neither editable nor
//! persisted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, FunctionRef};

/// Data type of a property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    Geopoint,
    Reference,
    Array,
    Map,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Geopoint => "geopoint",
            DataType::Reference => "reference",
            DataType::Array => "array",
            DataType::Map => "map",
        }
    }
}

/// Static properties keyed by field name, in display order.
pub type Properties = IndexMap<String, Property>;

/// Properties of a collection, which may include builders.
pub type PropertiesOrBuilders = IndexMap<String, PropertyOrBuilder>;

/// A static property definition.
///
/// Options without a dedicated field (validation rules, storage settings,
/// enum values, ...) are kept in `config` in their stored order.
///
/// # Examples
///
/// ```
/// use firecms_collections::property::{DataType, Property};
///
/// let publisher = Property::new(DataType::Map)
///     .with_name("Publisher")
///     .with_property("name", Property::new(DataType::String).with_name("Name"));
/// assert_eq!(publisher.properties.unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Discriminates the kind of field
    pub data_type: DataType,

    /// Label shown in forms and tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nested properties of a `map`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    /// Explicit order of the nested properties of a `map`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_order: Option<Vec<String>>,

    /// Element property of an `array`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<Box<Property>>,

    /// Remaining options
    #[serde(flatten)]
    pub config: IndexMap<String, FieldValue>,
}

impl Property {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            name: None,
            description: None,
            properties: None,
            properties_order: None,
            of: None,
            config: IndexMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a nested property (for `map` properties).
    pub fn with_property(mut self, key: impl Into<String>, property: Property) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), property);
        self
    }

    /// Set the element property (for `array` properties).
    pub fn with_of(mut self, of: Property) -> Self {
        self.of = Some(Box::new(of));
        self
    }

    /// Set a free-form option.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Dynamic form of the property, as written to the store.
    ///
    /// Unset optional fields are emitted as `Undefined` so a partial update
    /// clears values removed in the editor.
    pub fn to_field_value(&self) -> FieldValue {
        let mut fields = IndexMap::new();
        fields.insert(
            "dataType".to_string(),
            FieldValue::String(self.data_type.as_str().to_string()),
        );
        fields.insert("name".to_string(), self.name.clone().into());
        fields.insert("description".to_string(), self.description.clone().into());
        fields.insert(
            "properties".to_string(),
            self.properties
                .as_ref()
                .map(properties_to_field_value)
                .unwrap_or(FieldValue::Undefined),
        );
        fields.insert(
            "propertiesOrder".to_string(),
            self.properties_order
                .as_deref()
                .map(order_to_field_value)
                .unwrap_or(FieldValue::Undefined),
        );
        fields.insert(
            "of".to_string(),
            self.of
                .as_ref()
                .map(|of| of.to_field_value())
                .unwrap_or(FieldValue::Undefined),
        );
        for (key, value) in &self.config {
            fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        FieldValue::Map(fields)
    }
}

/// A collection property: a static definition or a builder.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyOrBuilder {
    Property(Property),
    Builder(FunctionRef),
}

impl PropertyOrBuilder {
    pub fn is_builder(&self) -> bool {
        matches!(self, PropertyOrBuilder::Builder(_))
    }

    /// The static definition, if this is not a builder.
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            PropertyOrBuilder::Property(p) => Some(p),
            PropertyOrBuilder::Builder(_) => None,
        }
    }
}

impl From<Property> for PropertyOrBuilder {
    fn from(property: Property) -> Self {
        PropertyOrBuilder::Property(property)
    }
}

/// Check if a property can be edited in the collection editor.
pub fn editable_property(property: &PropertyOrBuilder) -> bool {
    !property.is_builder()
}

/// Keep only the properties that can be edited and persisted.
pub fn remove_non_editable_properties(properties: &PropertiesOrBuilders) -> Properties {
    properties
        .iter()
        .filter_map(|(key, property)| match property {
            PropertyOrBuilder::Property(p) => Some((key.clone(), p.clone())),
            PropertyOrBuilder::Builder(builder) => {
                tracing::debug!(
                    property = %key,
                    builder = %builder.name(),
                    "Skipping builder property"
                );
                None
            }
        })
        .collect()
}

/// Order properties by an explicit key order.
///
/// Keys listed in `order` come first, in that order; keys the order does not
/// mention follow in their current order; order entries without a matching
/// property are ignored. Nested `map` properties are ordered by their own
/// `properties_order`.
pub fn sort_properties(properties: Properties, order: Option<&[String]>) -> Properties {
    let mut remaining = properties;
    let mut sorted = IndexMap::with_capacity(remaining.len());
    if let Some(order) = order {
        for key in order {
            if let Some((key, property)) = remaining.shift_remove_entry(key) {
                sorted.insert(key, property);
            }
        }
    }
    sorted.extend(remaining);

    for property in sorted.values_mut() {
        if property.data_type == DataType::Map {
            if let Some(nested) = property.properties.take() {
                property.properties =
                    Some(sort_properties(nested, property.properties_order.as_deref()));
            }
        }
    }
    sorted
}

/// Dynamic form of a property map.
pub fn properties_to_field_value(properties: &Properties) -> FieldValue {
    FieldValue::Map(
        properties
            .iter()
            .map(|(key, property)| (key.clone(), property.to_field_value()))
            .collect(),
    )
}

pub(crate) fn order_to_field_value(order: &[String]) -> FieldValue {
    FieldValue::Array(order.iter().cloned().map(FieldValue::String).collect())
}
