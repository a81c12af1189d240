// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Type shapes for method parameters and results.
//!
//! These types are used both for introspection (generating the spec
//! documents) and for argument resolution (checking incoming parameters
//! against the declared shapes).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::TypeValidation;

/// Schema for a parameter, result, or field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RpcTypeSchema {
    /// A scalar/primitive type with optional validation constraints.
    /// Recognized type names: `String`, `Int`, `Float`, `Boolean`,
    /// `DateTime`, `Json`.
    Scalar {
        type_name: String,
        validation: Option<TypeValidation>,
    },
    /// A reference to an enumeration declared in the schema map
    Enum { type_ref: String },
    /// A reference to an object type declared in the schema map
    Object { type_ref: String },
    /// An array of items
    Array { items: Box<RpcTypeSchema> },
    /// An optional type (wraps another type)
    Optional { inner: Box<RpcTypeSchema> },
    /// A union of alternatives (used for fields accepting one of several
    /// enum types; resolution must detect case-name collisions)
    Union { variants: Vec<RpcTypeSchema> },
}

impl RpcTypeSchema {
    pub fn scalar(type_name: impl Into<String>) -> Self {
        Self::Scalar {
            type_name: type_name.into(),
            validation: None,
        }
    }

    pub fn scalar_with_validation(
        type_name: impl Into<String>,
        validation: TypeValidation,
    ) -> Self {
        Self::Scalar {
            type_name: type_name.into(),
            validation: Some(validation),
        }
    }

    pub fn enum_ref(type_ref: impl Into<String>) -> Self {
        Self::Enum {
            type_ref: type_ref.into(),
        }
    }

    pub fn object(type_ref: impl Into<String>) -> Self {
        Self::Object {
            type_ref: type_ref.into(),
        }
    }

    pub fn array(items: RpcTypeSchema) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    pub fn optional(inner: RpcTypeSchema) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn union(variants: Vec<RpcTypeSchema>) -> Self {
        Self::Union { variants }
    }

    /// Wrap this schema to make it optional (if not already)
    pub fn into_optional(self) -> Self {
        match self {
            Self::Optional { .. } => self, // Already optional
            _ => Self::Optional {
                inner: Box::new(self),
            },
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional { .. })
    }

    /// The schema with any `Optional` wrapper removed
    pub fn unwrap_optional(&self) -> &RpcTypeSchema {
        match self {
            Self::Optional { inner } => inner.unwrap_optional(),
            other => other,
        }
    }

    /// Get the referenced type name for scalar/object/enum types
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Scalar { type_name, .. } => Some(type_name),
            Self::Object { type_ref, .. } => Some(type_ref),
            Self::Enum { type_ref } => Some(type_ref),
            Self::Optional { inner, .. } => inner.type_name(),
            Self::Array { items, .. } => items.type_name(),
            Self::Union { .. } => None,
        }
    }
}

/// An object type definition with named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<RpcObjectField>,
}

impl RpcObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: RpcObjectField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&RpcObjectField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A field within an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcObjectField {
    pub name: String,
    pub schema: RpcTypeSchema,
    pub description: Option<String>,
}

impl RpcObjectField {
    pub fn new(name: impl Into<String>, schema: RpcTypeSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The backing value of an enum case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Int(i64),
}

impl EnumValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            EnumValue::String(s) => serde_json::Value::String(s.clone()),
            EnumValue::Int(i) => serde_json::Value::Number((*i).into()),
        }
    }
}

/// An enumeration declaration. `value_backed` distinguishes enums whose cases
/// carry a wire value from bare name-only enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnumType {
    pub name: String,
    pub value_backed: bool,
    /// (case name, backing value) in declaration order
    pub variants: Vec<(String, EnumValue)>,
}

impl RpcEnumType {
    /// A value-backed enum (cases carry explicit wire values)
    pub fn backed(name: impl Into<String>, variants: Vec<(&str, EnumValue)>) -> Self {
        Self {
            name: name.into(),
            value_backed: true,
            variants: variants
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }
    }

    /// A name-only enum; each case's value is its own name
    pub fn unbacked(name: impl Into<String>, cases: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            value_backed: false,
            variants: cases
                .into_iter()
                .map(|n| (n.to_string(), EnumValue::String(n.to_string())))
                .collect(),
        }
    }

    pub fn case_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(n, _)| n.as_str())
    }

    pub fn value_for_case(&self, case: &str) -> Option<&EnumValue> {
        self.variants
            .iter()
            .find(|(n, _)| n == case)
            .map(|(_, v)| v)
    }
}

/// Named object and enum declarations shared by the registry, the argument
/// resolver, and the spec builders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaMap {
    pub objects: IndexMap<String, RpcObjectType>,
    pub enums: IndexMap<String, RpcEnumType>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: RpcObjectType) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn add_enum(&mut self, enum_type: RpcEnumType) {
        self.enums.insert(enum_type.name.clone(), enum_type);
    }

    pub fn get_object(&self, name: &str) -> Option<&RpcObjectType> {
        self.objects.get(name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&RpcEnumType> {
        self.enums.get(name)
    }

    /// Merge another schema map into this one, consuming the other map.
    pub fn merge(&mut self, other: SchemaMap) {
        self.objects.extend(other.objects);
        self.enums.extend(other.enums);
    }
}
