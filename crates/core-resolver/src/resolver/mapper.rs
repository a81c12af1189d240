// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Structural mapping of raw JSON values onto declared type shapes.
//!
//! Failures are collected as templated errors keyed by stable template
//! strings, so the localizer can swap whole templates before interpolation.

use core_model::{RpcEnumType, RpcTypeSchema, SymbolContext};
use serde_json::{Map, Value};

use crate::resolver::doc_types::ParameterDocResolver;
use crate::resolver::enum_coercion::{CoercionConflict, EnumCoercionPass};
use crate::resolver::localizer::MessageLocalizer;
use crate::violation::Violation;

pub const TYPE_MISMATCH: &str =
    "Value of type {actual_type} does not match expected type {expected_type}.";
pub const MISSING_FIELD: &str =
    "Cannot be empty and must be filled with a value of type {expected_type}.";
pub const INVALID_DATETIME: &str = "Invalid datetime value {source_value}.";
pub const UNKNOWN_ENUM_CASE: &str = "Unknown case {source_value} for enum {expected_type}.";
pub const UNDECLARED_TYPE: &str = "Type {expected_type} is not declared.";

/// One structural mapping failure: where it happened, which message template
/// applies, and the values to interpolate after template selection.
#[derive(Debug, Clone)]
pub struct MappingError {
    pub path: String,
    pub root: String,
    pub template: &'static str,
    pub args: Vec<(&'static str, String)>,
}

impl MappingError {
    fn new(path: &str, root: &str, template: &'static str) -> Self {
        Self {
            path: path.to_string(),
            root: root.to_string(),
            template,
            args: Vec::new(),
        }
    }

    fn with_arg(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.args.push((key, value.into()));
        self
    }

    pub fn to_violation(&self, localizer: &MessageLocalizer) -> Violation {
        let mut message = localizer.translate(self.template).to_string();
        for (key, value) in &self.args {
            message = message.replace(&format!("{{{key}}}"), value);
        }
        Violation::new(&self.path, message, &self.root)
    }
}

/// Why a mapping attempt produced no value.
#[derive(Debug)]
pub enum MapFailure {
    /// Per-field failures, aggregated across the whole walk
    Invalid(Vec<MappingError>),
    /// Enum-by-name resolution was ambiguous; fatal, never aggregated
    Ambiguous(CoercionConflict),
}

impl From<CoercionConflict> for MapFailure {
    fn from(conflict: CoercionConflict) -> Self {
        MapFailure::Ambiguous(conflict)
    }
}

fn single(error: MappingError) -> MapFailure {
    MapFailure::Invalid(vec![error])
}

/// The canonical name of a JSON value's runtime type, normalized to the
/// declared-type vocabulary (`Int`/`Float` instead of `integer`/`double`).
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Float",
        Value::Number(_) => "Int",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

/// Resolve one raw value against a declared shape. Scalars are type-checked,
/// enums coerced to their canonical wire value, objects structurally mapped
/// field by field, arrays element by element.
pub fn resolve_value(
    path: &str,
    root: &str,
    value: &Value,
    schema: &RpcTypeSchema,
    ctx: &SymbolContext,
    docs: &ParameterDocResolver<'_>,
) -> Result<Value, MapFailure> {
    match schema {
        RpcTypeSchema::Optional { inner } => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                resolve_value(path, root, value, inner, ctx, docs)
            }
        }
        RpcTypeSchema::Scalar { type_name, .. } => {
            resolve_scalar(path, root, value, type_name).map_err(single)
        }
        RpcTypeSchema::Enum { type_ref } => match docs.enum_type(ctx, type_ref) {
            Some(enum_type) => coerce_enum(path, root, value, enum_type).map_err(single),
            None => Err(single(
                MappingError::new(path, root, UNDECLARED_TYPE).with_arg("expected_type", type_ref),
            )),
        },
        RpcTypeSchema::Object { type_ref } => map_object(path, value, type_ref, ctx, docs),
        RpcTypeSchema::Array { items } => {
            let Value::Array(elements) = value else {
                return Err(single(type_mismatch(path, root, value, "Array")));
            };
            let mut mapped = Vec::with_capacity(elements.len());
            let mut errors = Vec::new();
            for (index, element) in elements.iter().enumerate() {
                let element_path = format!("{path}[{index}]");
                match resolve_value(&element_path, root, element, items, ctx, docs) {
                    Ok(v) => mapped.push(v),
                    Err(MapFailure::Invalid(e)) => errors.extend(e),
                    Err(ambiguous) => return Err(ambiguous),
                }
            }
            if errors.is_empty() {
                Ok(Value::Array(mapped))
            } else {
                Err(MapFailure::Invalid(errors))
            }
        }
        RpcTypeSchema::Union { variants } => {
            for variant in variants {
                match resolve_value(path, root, value, variant, ctx, docs) {
                    Ok(v) => return Ok(v),
                    Err(MapFailure::Invalid(_)) => continue,
                    Err(ambiguous) => return Err(ambiguous),
                }
            }
            let expected = variants
                .iter()
                .map(|v| v.type_name().unwrap_or("?"))
                .collect::<Vec<_>>()
                .join("|");
            Err(single(type_mismatch(path, root, value, &expected)))
        }
    }
}

/// Map a raw object onto a declared object type: enum-name coercion first,
/// then field-by-field resolution in declaration order. Undeclared incoming
/// keys are dropped.
pub fn map_object(
    path: &str,
    value: &Value,
    type_ref: &str,
    ctx: &SymbolContext,
    docs: &ParameterDocResolver<'_>,
) -> Result<Value, MapFailure> {
    let Some(object_type) = docs.object_type(ctx, type_ref) else {
        return Err(single(
            MappingError::new(path, path, UNDECLARED_TYPE).with_arg("expected_type", type_ref),
        ));
    };
    let root = &object_type.name;

    let Value::Object(raw) = value else {
        return Err(single(type_mismatch(path, root, value, &object_type.name)));
    };

    let coerced = EnumCoercionPass::apply(object_type, raw, ctx, docs)?;

    let mut mapped = Map::with_capacity(object_type.fields.len());
    let mut errors = Vec::new();

    for field in &object_type.fields {
        let field_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{path}.{}", field.name)
        };

        match coerced.get(&field.name) {
            None => {
                if field.schema.is_optional() {
                    mapped.insert(field.name.clone(), Value::Null);
                } else {
                    errors.push(
                        MappingError::new(&field_path, root, MISSING_FIELD).with_arg(
                            "expected_type",
                            field.schema.type_name().unwrap_or("?"),
                        ),
                    );
                }
            }
            Some(raw_field) => {
                match resolve_value(&field_path, root, raw_field, &field.schema, ctx, docs) {
                    Ok(v) => {
                        mapped.insert(field.name.clone(), v);
                    }
                    Err(MapFailure::Invalid(e)) => errors.extend(e),
                    Err(ambiguous) => return Err(ambiguous),
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(mapped))
    } else {
        Err(MapFailure::Invalid(errors))
    }
}

fn resolve_scalar(
    path: &str,
    root: &str,
    value: &Value,
    type_name: &str,
) -> Result<Value, MappingError> {
    let matches = match type_name {
        "Json" => true,
        "String" => value.is_string(),
        "Int" => value.is_i64() || value.is_u64(),
        // Integers widen to floats; never the reverse
        "Float" => value.is_number(),
        "Boolean" => value.is_boolean(),
        "DateTime" => {
            let Some(raw) = value.as_str() else {
                return Err(type_mismatch(path, root, value, type_name));
            };
            return if parse_datetime(raw) {
                Ok(value.clone())
            } else {
                Err(MappingError::new(path, root, INVALID_DATETIME)
                    .with_arg("source_value", raw.to_string()))
            };
        }
        // Unrecognized scalar names pass through unchecked
        _ => true,
    };

    if matches {
        Ok(value.clone())
    } else {
        Err(type_mismatch(path, root, value, type_name))
    }
}

fn parse_datetime(raw: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(raw).is_ok()
        || chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").is_ok()
        || chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

/// Coerce a raw value to an enum's canonical wire value. Value-backed enums
/// match case-insensitively on the backing value and yield `null` for
/// unknown input; name-only enums match on the case name and treat unknown
/// input as an error.
pub fn coerce_enum(
    path: &str,
    root: &str,
    value: &Value,
    enum_type: &RpcEnumType,
) -> Result<Value, MappingError> {
    if enum_type.value_backed {
        let matched = enum_type.variants.iter().find(|(_, backing)| {
            match (backing.to_json(), value) {
                (Value::String(declared), Value::String(actual)) => {
                    declared.eq_ignore_ascii_case(actual)
                }
                (declared, actual) => &declared == actual,
            }
        });
        Ok(matched
            .map(|(_, backing)| backing.to_json())
            .unwrap_or(Value::Null))
    } else {
        let matched = value.as_str().and_then(|raw| {
            enum_type
                .case_names()
                .find(|case| case.eq_ignore_ascii_case(raw))
        });
        match matched {
            Some(case) => Ok(Value::String(case.to_string())),
            None => Err(MappingError::new(path, root, UNKNOWN_ENUM_CASE)
                .with_arg("source_value", value.to_string())
                .with_arg("expected_type", enum_type.name.clone())),
        }
    }
}

fn type_mismatch(path: &str, root: &str, value: &Value, expected: &str) -> MappingError {
    MappingError::new(path, root, TYPE_MISMATCH)
        .with_arg("actual_type", json_type_name(value))
        .with_arg("expected_type", expected.to_string())
}
