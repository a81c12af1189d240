// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Per-invocation argument resolution.
//!
//! One pass over the declared parameters turns the raw JSON parameter map
//! into values a handler can trust. Failures are aggregated: the caller gets
//! every violation from one round trip, not just the first.

pub mod doc_types;
pub mod enum_coercion;
pub mod localizer;
pub mod mapper;

use core_model::{MethodDescriptor, RpcTypeSchema, SchemaMap};
use serde_json::{Map, Value};
use tracing::error;

use crate::plugin::method_handler::ResolvedArguments;
use crate::plugin::rpc_error::RpcError;
use crate::resolver::doc_types::ParameterDocResolver;
use crate::resolver::localizer::MessageLocalizer;
use crate::resolver::mapper::{self as value_mapper, MapFailure};
use crate::validator::ConstraintValidator;
use crate::violation::Violation;

pub struct ArgumentResolver;

impl ArgumentResolver {
    /// Resolve the raw parameter map against a method's declared signature.
    ///
    /// Resolution never stops at the first problem: every parameter is
    /// visited and every violation recorded, then the aggregate is raised as
    /// one `InvalidParams`. Only enum-name ambiguity aborts immediately.
    pub fn resolve(
        descriptor: &MethodDescriptor,
        raw_params: Option<&Value>,
        validator: &dyn ConstraintValidator,
        schemas: &SchemaMap,
        localizer: &MessageLocalizer,
    ) -> Result<ResolvedArguments, RpcError> {
        let raw: Map<String, Value> = match raw_params {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(RpcError::InvalidRequest),
        };

        // A variadic parameter short-circuits the whole pipeline: the
        // handler takes the wire map as-is.
        if descriptor.params.iter().any(|p| p.variadic) {
            return Ok(ResolvedArguments::Bulk(raw));
        }

        let docs = ParameterDocResolver::new(schemas);
        let ctx = &descriptor.symbol_context;

        if descriptor.auto_map_single_object {
            return Self::resolve_auto_mapped(descriptor, &raw, &docs, localizer);
        }

        let mut resolved: Vec<(String, Value)> = Vec::with_capacity(descriptor.params.len());
        let mut violations: Vec<Violation> = Vec::new();

        for param in &descriptor.params {
            let Some(raw_value) = raw.get(&param.name) else {
                if let Some(default) = &param.default {
                    resolved.push((param.name.clone(), default.clone()));
                } else if param.schema.is_optional() {
                    resolved.push((param.name.clone(), Value::Null));
                } else {
                    violations.push(Violation::new(
                        &param.name,
                        "Missing required parameter",
                        &descriptor.name,
                    ));
                }
                continue;
            };

            // Constraint failures are recorded but never block the type
            // resolution below.
            for constraint in &param.constraints {
                violations.extend(validator.validate(
                    &param.name,
                    raw_value,
                    constraint,
                    &descriptor.name,
                ));
            }

            match value_mapper::resolve_value(
                &param.name,
                &descriptor.name,
                raw_value,
                &param.schema,
                ctx,
                &docs,
            ) {
                Ok(value) => resolved.push((param.name.clone(), value)),
                Err(MapFailure::Invalid(errors)) => {
                    violations.extend(errors.iter().map(|e| e.to_violation(localizer)));
                }
                Err(MapFailure::Ambiguous(conflict)) => {
                    return Err(RpcError::AmbiguousEnumValue {
                        field: conflict.field,
                        types: conflict.types,
                    });
                }
            }
        }

        if violations.is_empty() {
            Ok(ResolvedArguments::Named(resolved))
        } else {
            Err(RpcError::InvalidParams(violations))
        }
    }

    /// Auto-map mode: the whole raw map becomes one object of the sole
    /// declared parameter's type. Declaring it with more than one parameter
    /// is a handler bug, not a caller mistake.
    fn resolve_auto_mapped(
        descriptor: &MethodDescriptor,
        raw: &Map<String, Value>,
        docs: &ParameterDocResolver<'_>,
        localizer: &MessageLocalizer,
    ) -> Result<ResolvedArguments, RpcError> {
        let [param] = descriptor.params.as_slice() else {
            error!(
                method = %descriptor.name,
                params = descriptor.params.len(),
                "auto-map requires exactly one declared parameter"
            );
            return Err(RpcError::InternalError);
        };

        let RpcTypeSchema::Object { type_ref } = param.schema.unwrap_optional() else {
            error!(
                method = %descriptor.name,
                "auto-map parameter must be an object type"
            );
            return Err(RpcError::InternalError);
        };

        match value_mapper::map_object(
            &param.name,
            &Value::Object(raw.clone()),
            type_ref,
            &descriptor.symbol_context,
            docs,
        ) {
            Ok(value) => Ok(ResolvedArguments::Named(vec![(param.name.clone(), value)])),
            Err(MapFailure::Invalid(errors)) => Err(RpcError::InvalidParams(
                errors.iter().map(|e| e.to_violation(localizer)).collect(),
            )),
            Err(MapFailure::Ambiguous(conflict)) => Err(RpcError::AmbiguousEnumValue {
                field: conflict.field,
                types: conflict.types,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::DefaultValidator;
    use core_model::{
        EnumValue, IntConstraints, ParamDescriptor, ResultDescriptor, RpcEnumType, RpcObjectField,
        RpcObjectType, SymbolContext, TypeValidation,
    };
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

    fn descriptor() -> MethodDescriptor {
        MethodDescriptor::new(
            "hr.staff.createEmployee",
            ResultDescriptor::new(RpcTypeSchema::scalar("Int")),
        )
        .with_symbol_context(SymbolContext::new("hr.staff"))
    }

    fn resolve(
        descriptor: &MethodDescriptor,
        params: Value,
    ) -> Result<ResolvedArguments, RpcError> {
        ArgumentResolver::resolve(
            descriptor,
            Some(&params),
            &DefaultValidator,
            &schemas(),
            &MessageLocalizer::passthrough(),
        )
    }

    #[test]
    fn all_violations_are_aggregated() {
        let descriptor = descriptor()
            .with_param(ParamDescriptor::new("name", RpcTypeSchema::scalar("String")))
            .with_param(ParamDescriptor::new("age", RpcTypeSchema::scalar("Int")));

        let err = resolve(&descriptor, json!({})).unwrap_err();

        let RpcError::InvalidParams(violations) = err else {
            panic!("expected InvalidParams");
        };
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "name");
        assert_eq!(violations[1].path, "age");
        assert_eq!(violations[0].root, "hr.staff.createEmployee");
    }

    #[test]
    fn defaults_and_nullable_nulls() {
        let descriptor = descriptor()
            .with_param(
                ParamDescriptor::new("limit", RpcTypeSchema::scalar("Int")).with_default(json!(50)),
            )
            .with_param(ParamDescriptor::new(
                "filter",
                RpcTypeSchema::optional(RpcTypeSchema::scalar("String")),
            ));

        let resolved = resolve(&descriptor, json!({})).unwrap();

        assert_eq!(resolved.get("limit"), Some(&json!(50)));
        assert_eq!(resolved.get("filter"), Some(&Value::Null));
    }

    #[test]
    fn variadic_passes_the_map_through() {
        let descriptor = descriptor().with_param(
            ParamDescriptor::new("rest", RpcTypeSchema::scalar("Json")).variadic(),
        );

        let resolved = resolve(&descriptor, json!({"anything": [1, 2], "goes": true})).unwrap();

        let ResolvedArguments::Bulk(map) = resolved else {
            panic!("expected bulk mode");
        };
        assert_eq!(map["anything"], json!([1, 2]));
    }

    #[test]
    fn constraint_failure_does_not_stop_type_resolution() {
        let descriptor = descriptor().with_param(
            ParamDescriptor::new("priority", RpcTypeSchema::scalar("Int"))
                .with_constraint(TypeValidation::Int(IntConstraints::from_range(1, 5))),
        );

        let err = resolve(&descriptor, json!({"priority": "nine"})).unwrap_err();
        let RpcError::InvalidParams(violations) = err else {
            panic!("expected InvalidParams");
        };
        assert_eq!(violations.len(), 1); // wrong type skips the range check
        assert!(violations[0].message.contains("does not match expected type Int"));

        let err = resolve(&descriptor, json!({"priority": 9})).unwrap_err();
        let RpcError::InvalidParams(violations) = err else {
            panic!("expected InvalidParams");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "This value should be 5 or less.");
    }

    #[test]
    fn dto_array_parameter() {
        let descriptor = descriptor().with_param(ParamDescriptor::new(
            "employees",
            RpcTypeSchema::array(RpcTypeSchema::object("Employee")),
        ));

        let resolved = resolve(
            &descriptor,
            json!({"employees": [{"name": "Ada", "status": "dismissed"}]}),
        )
        .unwrap();

        assert_eq!(
            resolved.get("employees"),
            Some(&json!([{"name": "Ada", "status": 2}]))
        );
    }

    #[test]
    fn top_level_enum_parameter() {
        let descriptor = descriptor().with_param(ParamDescriptor::new(
            "status",
            RpcTypeSchema::enum_ref("EmployeeStatus"),
        ));

        // Backed enums match by backing value at the parameter level
        let resolved = resolve(&descriptor, json!({"status": 2})).unwrap();
        assert_eq!(resolved.get("status"), Some(&json!(2)));

        let resolved = resolve(&descriptor, json!({"status": 99})).unwrap();
        assert_eq!(resolved.get("status"), Some(&Value::Null));
    }

    #[test]
    fn auto_map_wraps_the_whole_map() {
        let descriptor = descriptor()
            .auto_map_single_object()
            .with_param(ParamDescriptor::new(
                "employee",
                RpcTypeSchema::object("Employee"),
            ));

        let resolved = resolve(&descriptor, json!({"name": "Ada", "status": "ACTIVE"})).unwrap();

        assert_eq!(
            resolved.get("employee"),
            Some(&json!({"name": "Ada", "status": 1}))
        );
    }

    #[test]
    fn auto_map_with_two_params_is_a_server_bug() {
        let descriptor = descriptor()
            .auto_map_single_object()
            .with_param(ParamDescriptor::new(
                "employee",
                RpcTypeSchema::object("Employee"),
            ))
            .with_param(ParamDescriptor::new("extra", RpcTypeSchema::scalar("Int")));

        let err = resolve(&descriptor, json!({"name": "Ada", "status": 1})).unwrap_err();
        assert!(matches!(err, RpcError::InternalError));
    }

    #[test]
    fn non_object_params_are_rejected() {
        let descriptor = descriptor();

        let err = resolve(&descriptor, json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, RpcError::InvalidRequest));
    }

    #[test]
    fn localized_mapper_messages() {
        let descriptor = descriptor().with_param(ParamDescriptor::new(
            "employee",
            RpcTypeSchema::object("Employee"),
        ));

        let err = ArgumentResolver::resolve(
            &descriptor,
            Some(&json!({"employee": {"status": 1}})),
            &DefaultValidator,
            &schemas(),
            &MessageLocalizer::for_locale("ru"),
        )
        .unwrap_err();

        let RpcError::InvalidParams(violations) = err else {
            panic!("expected InvalidParams");
        };
        assert_eq!(violations[0].path, "employee.name");
        assert!(violations[0].message.contains("Не может быть пустым"));
        assert_eq!(violations[0].root, "hr.staff.Employee");
    }
}
