// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Self-contained JSON Schemas for MCP tool inputs.
//!
//! MCP clients receive the input schema inline with the tool listing, so
//! named types are expanded in place rather than referenced.

use core_model::{MethodDescriptor, RpcTypeSchema, SchemaMap, SymbolContext};
use serde_json::{Map, Value, json};

/// The input schema of one tool: an object with a property per declared
/// parameter, required parameters listed.
pub(crate) fn input_schema(descriptor: &MethodDescriptor, schemas: &SchemaMap) -> Value {
    let ctx = &descriptor.symbol_context;
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &descriptor.params {
        let mut schema = type_schema(&param.schema, ctx, schemas, 0);
        if let Some(description) = &param.description
            && let Some(obj) = schema.as_object_mut()
        {
            obj.insert("description".to_string(), json!(description));
        }
        properties.insert(param.name.clone(), schema);
        if param.is_required() {
            required.push(param.name.clone());
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn type_schema(
    schema: &RpcTypeSchema,
    ctx: &SymbolContext,
    schemas: &SchemaMap,
    depth: usize,
) -> Value {
    // Recursive DTOs bottom out as plain objects
    if depth > 8 {
        return json!({"type": "object"});
    }

    match schema {
        RpcTypeSchema::Scalar { type_name, .. } => match type_name.as_str() {
            "Int" => json!({"type": "integer"}),
            "Float" => json!({"type": "number"}),
            "Boolean" => json!({"type": "boolean"}),
            "DateTime" => json!({"type": "string", "format": "date-time"}),
            "Json" => json!({}),
            _ => json!({"type": "string"}),
        },
        RpcTypeSchema::Optional { inner } => type_schema(inner, ctx, schemas, depth),
        RpcTypeSchema::Array { items } => json!({
            "type": "array",
            "items": type_schema(items, ctx, schemas, depth + 1),
        }),
        RpcTypeSchema::Enum { type_ref } => {
            match schemas
                .get_enum(&ctx.qualify(type_ref))
                .or_else(|| schemas.get_enum(type_ref))
            {
                Some(enum_type) => {
                    let values: Vec<Value> =
                        enum_type.variants.iter().map(|(_, v)| v.to_json()).collect();
                    json!({"enum": values})
                }
                None => json!({}),
            }
        }
        RpcTypeSchema::Object { type_ref } => {
            match schemas
                .get_object(&ctx.qualify(type_ref))
                .or_else(|| schemas.get_object(type_ref))
            {
                Some(object_type) => {
                    let mut properties = Map::new();
                    let mut required = Vec::new();
                    for field in &object_type.fields {
                        properties.insert(
                            field.name.clone(),
                            type_schema(&field.schema, ctx, schemas, depth + 1),
                        );
                        if !field.schema.is_optional() {
                            required.push(field.name.clone());
                        }
                    }
                    json!({
                        "type": "object",
                        "properties": properties,
                        "required": required,
                    })
                }
                None => json!({"type": "object"}),
            }
        }
        RpcTypeSchema::Union { variants } => json!({
            "anyOf": variants
                .iter()
                .map(|v| type_schema(v, ctx, schemas, depth + 1))
                .collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{
        EnumValue, ParamDescriptor, ResultDescriptor, RpcEnumType, RpcObjectField, RpcObjectType,
    };

    #[test]
    fn dto_parameters_are_inlined() {
        let mut schemas = SchemaMap::new();
        schemas.add_enum(RpcEnumType::backed(
            "hr.staff.EmployeeStatus",
            vec![
                ("ACTIVE", EnumValue::Int(1)),
                ("DISMISSED", EnumValue::Int(2)),
            ],
        ));
        schemas.add_object(
            RpcObjectType::new("hr.staff.Employee")
                .with_field(RpcObjectField::new("name", RpcTypeSchema::scalar("String")))
                .with_field(RpcObjectField::new(
                    "status",
                    RpcTypeSchema::enum_ref("EmployeeStatus"),
                )),
        );

        let descriptor = MethodDescriptor::new(
            "hr.staff.createEmployee",
            ResultDescriptor::new(RpcTypeSchema::scalar("Int")),
        )
        .with_symbol_context(SymbolContext::new("hr.staff"))
        .with_param(ParamDescriptor::new(
            "employee",
            RpcTypeSchema::object("Employee"),
        ))
        .with_param(ParamDescriptor::new(
            "notify",
            RpcTypeSchema::optional(RpcTypeSchema::scalar("Boolean")),
        ));

        let schema = input_schema(&descriptor, &schemas);

        assert_eq!(schema["required"], json!(["employee"]));
        let employee = &schema["properties"]["employee"];
        assert_eq!(employee["type"], "object");
        assert_eq!(employee["properties"]["name"]["type"], "string");
        assert_eq!(employee["properties"]["status"]["enum"], json!([1, 2]));
    }
}
