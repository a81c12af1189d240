// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Canned method providers for tests across the workspace: a read-only
//! rewards catalog and a small HR area exercising DTO mapping, enums,
//! capabilities, and handler errors.

use std::sync::Arc;

use async_trait::async_trait;
use common::context::RequestContext;
use core_model::{
    EnumValue, MethodDescriptor, MethodExample, ParamDescriptor, ResultDescriptor, RpcEnumType,
    RpcObjectField, RpcObjectType, RpcTypeSchema, SchemaMap, StringConstraints, SymbolContext,
    TypeValidation,
};
use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::plugin::method_handler::{
    MethodError, MethodHandler, MethodProvider, ResolvedArguments,
};
use crate::registry::RegistryError;

pub fn fixture_providers() -> Vec<Box<dyn MethodProvider>> {
    vec![Box::new(RewardsProvider), Box::new(HrProvider)]
}

pub struct RewardsProvider;

impl MethodProvider for RewardsProvider {
    fn id(&self) -> &'static str {
        "rewards-fixture"
    }

    fn methods(&self) -> Result<Vec<Arc<dyn MethodHandler>>, RegistryError> {
        Ok(vec![Arc::new(GetCountryList)])
    }

    fn schemas(&self) -> SchemaMap {
        let mut schemas = SchemaMap::new();
        schemas.add_object(
            RpcObjectType::new("events.rewards.Country")
                .with_field(RpcObjectField::new("code", RpcTypeSchema::scalar("String")))
                .with_field(RpcObjectField::new("name", RpcTypeSchema::scalar("String"))),
        );
        schemas
    }
}

struct GetCountryList;

#[async_trait]
impl MethodHandler for GetCountryList {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "events.rewards.getCountryList",
            ResultDescriptor::new(RpcTypeSchema::array(RpcTypeSchema::object(
                "events.rewards.Country",
            ))),
        )
        .with_summary("Countries available for reward delivery")
        .read_only()
        .with_tag("rewards")
        .with_symbol_context(SymbolContext::new("events.rewards"))
        .with_example(
            "two countries",
            MethodExample::new(
                IndexMap::new(),
                json!([
                    {"code": "NL", "name": "Netherlands"},
                    {"code": "PT", "name": "Portugal"}
                ]),
            ),
        )
    }

    async fn invoke(
        &self,
        _args: ResolvedArguments,
        _request_context: &RequestContext<'_>,
    ) -> Result<Value, MethodError> {
        Ok(json!([
            {"code": "NL", "name": "Netherlands"},
            {"code": "PT", "name": "Portugal"}
        ]))
    }
}

pub struct HrProvider;

impl MethodProvider for HrProvider {
    fn id(&self) -> &'static str {
        "hr-fixture"
    }

    fn methods(&self) -> Result<Vec<Arc<dyn MethodHandler>>, RegistryError> {
        Ok(vec![
            Arc::new(CreateEmployee),
            Arc::new(FindEmployee),
            Arc::new(UpdateBadge),
        ])
    }

    fn schemas(&self) -> SchemaMap {
        let mut schemas = SchemaMap::new();
        schemas.add_enum(RpcEnumType::backed(
            "hr.staff.EmployeeStatus",
            vec![
                ("ACTIVE", EnumValue::Int(1)),
                ("DISMISSED", EnumValue::Int(2)),
            ],
        ));
        // Shares the ACTIVE case name with EmployeeStatus; unions of the two
        // are deliberately ambiguous
        schemas.add_enum(RpcEnumType::backed(
            "hr.staff.BadgeState",
            vec![
                ("ACTIVE", EnumValue::String("on".to_string())),
                ("REVOKED", EnumValue::String("off".to_string())),
            ],
        ));
        schemas.add_object(
            RpcObjectType::new("hr.staff.Employee")
                .with_field(RpcObjectField::new("name", RpcTypeSchema::scalar("String")))
                .with_field(RpcObjectField::new(
                    "status",
                    RpcTypeSchema::enum_ref("EmployeeStatus"),
                ))
                .with_field(RpcObjectField::new(
                    "hiredAt",
                    RpcTypeSchema::optional(RpcTypeSchema::scalar("DateTime")),
                )),
        );
        schemas.add_object(RpcObjectType::new("hr.staff.Badge").with_field(RpcObjectField::new(
            "state",
            RpcTypeSchema::union(vec![
                RpcTypeSchema::enum_ref("EmployeeStatus"),
                RpcTypeSchema::enum_ref("BadgeState"),
            ]),
        )));
        schemas
    }
}

struct CreateEmployee;

#[async_trait]
impl MethodHandler for CreateEmployee {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "hr.staff.createEmployee",
            ResultDescriptor::new(RpcTypeSchema::scalar("Int")).with_description("New employee id"),
        )
        .with_summary("Register a new employee")
        .with_tag("hr")
        .with_capability("hr.write")
        .with_symbol_context(SymbolContext::new("hr.staff"))
        .auto_map_single_object()
        .with_param(
            ParamDescriptor::new("employee", RpcTypeSchema::object("Employee"))
                .with_description("The employee record to create"),
        )
        .with_error(409, "employee already exists")
        .with_example(
            "minimal",
            MethodExample::new(
                IndexMap::from([
                    ("name".to_string(), json!("Ada")),
                    ("status".to_string(), json!(1)),
                ]),
                json!(7),
            ),
        )
    }

    async fn invoke(
        &self,
        args: ResolvedArguments,
        _request_context: &RequestContext<'_>,
    ) -> Result<Value, MethodError> {
        let employee = args.get("employee").cloned().unwrap_or(Value::Null);
        if employee["name"] == json!("Duplicate") {
            return Err(MethodError::new(409, "employee already exists")
                .with_data(json!({"name": "Duplicate"})));
        }
        Ok(json!(7))
    }
}

struct FindEmployee;

#[async_trait]
impl MethodHandler for FindEmployee {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "hr.staff.findEmployee",
            ResultDescriptor::new(RpcTypeSchema::object("Employee")),
        )
        .with_summary("Look up an employee by name")
        .read_only()
        .with_tag("hr")
        .with_symbol_context(SymbolContext::new("hr.staff"))
        .with_param(
            ParamDescriptor::new("name", RpcTypeSchema::scalar("String")).with_constraint(
                TypeValidation::String(StringConstraints::from_length_range(1, 100)),
            ),
        )
        .with_example(
            "found",
            MethodExample::new(
                IndexMap::from([("name".to_string(), json!("Ada"))]),
                json!({"name": "Ada", "status": 1, "hiredAt": null}),
            ),
        )
    }

    async fn invoke(
        &self,
        args: ResolvedArguments,
        _request_context: &RequestContext<'_>,
    ) -> Result<Value, MethodError> {
        match args.get("name").and_then(|v| v.as_str()) {
            Some("Ada") => Ok(json!({"name": "Ada", "status": 1, "hiredAt": null})),
            Some(name) => Err(MethodError::new(404, format!("no employee named {name}"))),
            None => Err(MethodError::new(400, "name is required")),
        }
    }
}

struct UpdateBadge;

#[async_trait]
impl MethodHandler for UpdateBadge {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "hr.staff.updateBadge",
            ResultDescriptor::new(RpcTypeSchema::scalar("Boolean")),
        )
        .with_tag("hr")
        .with_symbol_context(SymbolContext::new("hr.staff"))
        .with_param(ParamDescriptor::new(
            "badge",
            RpcTypeSchema::object("Badge"),
        ))
    }

    async fn invoke(
        &self,
        _args: ResolvedArguments,
        _request_context: &RequestContext<'_>,
    ) -> Result<Value, MethodError> {
        Ok(Value::Bool(true))
    }
}
