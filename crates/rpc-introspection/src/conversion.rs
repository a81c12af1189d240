// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Conversion from method descriptors to an OpenRPC document.

use core_model::{
    MethodDescriptor, ParamDescriptor, RpcObjectType, RpcTypeSchema, SchemaMap, SymbolContext,
    TypeValidation,
};

use crate::openrpc::{
    Components, ContentDescriptor, ErrorObject, ExamplePairing, JsonSchema, JsonSchemaInline,
    JsonSchemaRef, MethodObject, OpenRpcDocument, ServerObject,
};

/// Convert method descriptors plus their named schemas to an OpenRPC
/// document. Named object and enum types are registered once under
/// `components.schemas` (keyed by fully qualified name) and referenced by
/// `$ref` everywhere they occur.
pub fn to_openrpc(
    descriptors: &[MethodDescriptor],
    schemas: &SchemaMap,
    title: &str,
    version: &str,
    server_url: Option<&str>,
) -> OpenRpcDocument {
    let mut doc = OpenRpcDocument::new(title, version);

    if let Some(url) = server_url {
        doc = doc.with_server(ServerObject::new("default", url));
    }

    let mut components = Components::new();

    for descriptor in descriptors {
        doc.methods.push(convert_method(descriptor));
        register_referenced_types(descriptor, schemas, &mut components);
    }

    if components.schemas.is_some() {
        doc.components = Some(components);
    }

    doc
}

fn convert_method(descriptor: &MethodDescriptor) -> MethodObject {
    let ctx = &descriptor.symbol_context;
    let mut result =
        ContentDescriptor::new("result", convert_type_schema(&descriptor.result.schema, ctx));
    if let Some(description) = &descriptor.result.description {
        result = result.with_description(description);
    }

    let mut method = MethodObject::new(&descriptor.name, result);

    if let Some(summary) = &descriptor.summary {
        method = method.with_summary(summary);
    }
    if let Some(description) = &descriptor.description {
        method = method.with_description(description);
    }
    if descriptor.deprecated {
        method = method.deprecated();
    }
    for tag in &descriptor.tags {
        method = method.with_tag(tag);
    }
    for param in &descriptor.params {
        method = method.with_param(convert_parameter(param, ctx));
    }
    for (name, example) in &descriptor.examples {
        let mut pairing = ExamplePairing::new(name);
        for (param_name, value) in &example.params {
            pairing = pairing.with_param(param_name, value.clone());
        }
        method = method.with_example(pairing.with_result(example.result.clone()));
    }
    for error in &descriptor.errors {
        method = method.with_error(ErrorObject {
            code: error.code,
            message: error.message.clone(),
        });
    }

    method
}

fn convert_parameter(param: &ParamDescriptor, ctx: &SymbolContext) -> ContentDescriptor {
    let schema = convert_type_schema(&param.schema, ctx);
    let mut descriptor = ContentDescriptor::new(&param.name, schema);

    if let Some(desc) = &param.description {
        descriptor = descriptor.with_description(desc);
    }
    if param.deprecated {
        descriptor = descriptor.deprecated();
    }

    if param.is_required() {
        descriptor = descriptor.required();
    } else {
        descriptor = descriptor.optional();
    }

    descriptor
}

fn convert_type_schema(schema: &RpcTypeSchema, ctx: &SymbolContext) -> JsonSchema {
    match schema {
        RpcTypeSchema::Scalar {
            type_name,
            validation,
        } => {
            let mut inline = type_name_to_json_schema(type_name);

            if let Some(validation) = validation {
                inline = apply_validation(inline, validation);
            }

            JsonSchema::Inline(inline)
        }

        RpcTypeSchema::Enum { type_ref } | RpcTypeSchema::Object { type_ref } => {
            JsonSchema::Ref(JsonSchemaRef::component(ctx.qualify(type_ref)))
        }

        RpcTypeSchema::Array { items } => {
            let items_schema = convert_type_schema(items, ctx);
            JsonSchema::Inline(JsonSchemaInline::array(items_schema))
        }

        RpcTypeSchema::Optional { inner } => {
            let inner_schema = convert_type_schema(inner, ctx);
            match inner_schema {
                JsonSchema::Inline(inline) => JsonSchema::Inline(inline.with_nullable()),
                JsonSchema::Ref(ref_schema) => {
                    // For refs, we just return the ref as-is
                    // In a full implementation, we'd use oneOf/anyOf for nullable refs
                    JsonSchema::Ref(ref_schema)
                }
            }
        }

        RpcTypeSchema::Union { variants } => {
            // Rendered as the first variant's schema; JSON-RPC tooling has
            // no portable oneOf at the content-descriptor level
            match variants.first() {
                Some(first) => convert_type_schema(first, ctx),
                None => JsonSchema::Inline(JsonSchemaInline::default()),
            }
        }
    }
}

/// Walk a descriptor's parameter and result shapes and register every named
/// type they reach (transitively through object fields) into the components
/// table. Each type is converted at most once.
fn register_referenced_types(
    descriptor: &MethodDescriptor,
    schemas: &SchemaMap,
    components: &mut Components,
) {
    let ctx = &descriptor.symbol_context;
    for param in &descriptor.params {
        register_type_schema(&param.schema, ctx, schemas, components);
    }
    register_type_schema(&descriptor.result.schema, ctx, schemas, components);
}

fn register_type_schema(
    schema: &RpcTypeSchema,
    ctx: &SymbolContext,
    schemas: &SchemaMap,
    components: &mut Components,
) {
    match schema {
        RpcTypeSchema::Scalar { .. } => {}
        RpcTypeSchema::Optional { inner } => register_type_schema(inner, ctx, schemas, components),
        RpcTypeSchema::Array { items } => register_type_schema(items, ctx, schemas, components),
        RpcTypeSchema::Union { variants } => {
            for variant in variants {
                register_type_schema(variant, ctx, schemas, components);
            }
        }
        RpcTypeSchema::Enum { type_ref } => {
            let qualified = ctx.qualify(type_ref);
            if components.contains(&qualified) {
                return;
            }
            if let Some(enum_type) = schemas
                .get_enum(&qualified)
                .or_else(|| schemas.get_enum(type_ref))
            {
                let values = enum_type.variants.iter().map(|(_, v)| v.to_json()).collect();
                components.add_schema(
                    qualified,
                    JsonSchema::Inline(JsonSchemaInline::default().with_enum_values(values)),
                );
            }
        }
        RpcTypeSchema::Object { type_ref } => {
            let qualified = ctx.qualify(type_ref);
            if components.contains(&qualified) {
                return;
            }
            if let Some(object_type) = schemas
                .get_object(&qualified)
                .or_else(|| schemas.get_object(type_ref))
            {
                components.add_schema(qualified, convert_object_type(object_type, ctx));
                // Fields may reference further named types
                for field in &object_type.fields {
                    register_type_schema(&field.schema, ctx, schemas, components);
                }
            }
        }
    }
}

fn convert_object_type(object_type: &RpcObjectType, ctx: &SymbolContext) -> JsonSchema {
    let mut schema = JsonSchemaInline::object();

    if let Some(desc) = &object_type.description {
        schema = schema.with_description(desc);
    }

    let mut required_fields = Vec::new();

    for field in &object_type.fields {
        let field_schema = convert_type_schema(&field.schema, ctx);

        if !field.schema.is_optional() {
            required_fields.push(field.name.clone());
        }

        schema = schema.with_property(&field.name, field_schema);
    }

    if !required_fields.is_empty() {
        schema = schema.with_required(required_fields);
    }

    JsonSchema::Inline(schema)
}

fn type_name_to_json_schema(type_name: &str) -> JsonSchemaInline {
    match type_name {
        "Int" => JsonSchemaInline::integer(),
        "Float" => JsonSchemaInline::number(),
        "String" => JsonSchemaInline::string(),
        "Boolean" => JsonSchemaInline::boolean(),
        "DateTime" => JsonSchemaInline::string().with_format("date-time"),
        "Json" => JsonSchemaInline::default(), // Any type
        _ => JsonSchemaInline::default(),      // Unknown type
    }
}

fn apply_validation(mut schema: JsonSchemaInline, validation: &TypeValidation) -> JsonSchemaInline {
    match validation {
        TypeValidation::Int(constraints) => {
            if let Some(min) = constraints.min {
                schema = schema.with_minimum(serde_json::Number::from(min));
            }
            if let Some(max) = constraints.max {
                schema = schema.with_maximum(serde_json::Number::from(max));
            }
        }
        TypeValidation::Float(constraints) => {
            if let Some(min) = constraints.min
                && let Some(num) = serde_json::Number::from_f64(min)
            {
                schema = schema.with_minimum(num);
            }
            if let Some(max) = constraints.max
                && let Some(num) = serde_json::Number::from_f64(max)
            {
                schema = schema.with_maximum(num);
            }
        }
        TypeValidation::String(constraints) => {
            if let Some(min_length) = constraints.min_length {
                schema = schema.with_min_length(min_length);
            }
            if let Some(max_length) = constraints.max_length {
                schema = schema.with_max_length(max_length);
            }
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{
        EnumValue, IntConstraints, MethodExample, ResultDescriptor, RpcEnumType, RpcObjectField,
    };
    use indexmap::IndexMap;
    use serde_json::json;

    fn schemas() -> SchemaMap {
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
        schemas
    }

    fn find_employee() -> MethodDescriptor {
        MethodDescriptor::new(
            "hr.staff.findEmployee",
            ResultDescriptor::new(RpcTypeSchema::object("Employee")),
        )
        .with_summary("Look up an employee")
        .with_tag("hr")
        .with_symbol_context(SymbolContext::new("hr.staff"))
        .with_param(ParamDescriptor::new("name", RpcTypeSchema::scalar("String")))
        .with_error(404, "no such employee")
        .with_example(
            "found",
            MethodExample::new(
                IndexMap::from([("name".to_string(), json!("Ada"))]),
                json!({"name": "Ada", "status": 1}),
            ),
        )
    }

    #[test]
    fn named_types_are_registered_once_and_referenced() {
        let descriptors = vec![find_employee(), find_employee().deprecated()];

        let doc = to_openrpc(&descriptors, &schemas(), "Operon", "1.0", Some("/rpc"));

        let components = doc.components.unwrap();
        let tables = components.schemas.unwrap();
        assert!(tables.contains_key("hr.staff.Employee"));
        assert!(tables.contains_key("hr.staff.EmployeeStatus"));
        assert_eq!(tables.len(), 2);

        let result = serde_json::to_value(&doc.methods[0].result.schema).unwrap();
        assert_eq!(result["$ref"], "#/components/schemas/hr.staff.Employee");
    }

    #[test]
    fn examples_errors_and_tags_are_carried() {
        let doc = to_openrpc(&[find_employee()], &schemas(), "Operon", "1.0", None);

        let method = &doc.methods[0];
        assert_eq!(method.tags[0].name, "hr");
        assert_eq!(method.errors[0].code, 404);
        assert_eq!(method.examples[0].name, "found");
        assert_eq!(method.examples[0].params[0].value, json!("Ada"));
        assert_eq!(
            method.examples[0].result.as_ref().unwrap().value,
            json!({"name": "Ada", "status": 1})
        );
    }

    #[test]
    fn backed_enum_values_appear_in_components() {
        let doc = to_openrpc(&[find_employee()], &schemas(), "Operon", "1.0", None);

        let tables = doc.components.unwrap().schemas.unwrap();
        assert_eq!(tables["hr.staff.EmployeeStatus"]["enum"], json!([1, 2]));
    }

    #[test]
    fn validation_constraints_land_in_the_schema() {
        let schema_type = RpcTypeSchema::scalar_with_validation(
            "Int",
            TypeValidation::Int(IntConstraints::from_range(1, 100)),
        );

        let json_schema = convert_type_schema(&schema_type, &SymbolContext::default());

        let json = serde_json::to_value(&json_schema).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["minimum"], 1);
        assert_eq!(json["maximum"], 100);
    }

    #[test]
    fn optional_parameters_are_marked() {
        let param = ParamDescriptor::new(
            "filter",
            RpcTypeSchema::optional(RpcTypeSchema::scalar("String")),
        );

        let descriptor = convert_parameter(&param, &SymbolContext::default());

        assert_eq!(descriptor.required, Some(false));
    }
}
