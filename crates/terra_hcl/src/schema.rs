//! Property schemas attached to resource type registrations.
//!
//! The compiler reads only `required` and `default_value`; the remaining
//! constraints travel with the registration for editors.

use serde::{Deserialize, Serialize};

use crate::model::PropertyValue;

/// Field kinds an editor can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyFieldType {
    String,
    Number,
    Boolean,
    Select,
    Cidr,
    Tags,
    Array,
    Reference,
}

/// Validation constraints for a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Name of a validator the editor resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator: Option<String>,
}

/// Schema for one property of a resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub key: String,
    pub label: String,
    pub field_type: PropertyFieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<PropertyValidation>,
}

impl PropertySchema {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: PropertyFieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            default_value: None,
            validation: None,
        }
    }

    /// A required string property.
    pub fn string(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, PropertyFieldType::String).required()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_validation(mut self, validation: PropertyValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}
