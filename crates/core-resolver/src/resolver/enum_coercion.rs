// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::{RpcEnumType, RpcObjectType, RpcTypeSchema, SymbolContext};
use serde_json::{Map, Value};

use crate::resolver::doc_types::ParameterDocResolver;

/// Two or more enum types in a union declare the same case name; resolving
/// the incoming value by name would have to pick one arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionConflict {
    pub field: String,
    pub types: Vec<String>,
}

/// Rewrites enum case names into their backing values across one raw object,
/// so the structural mapper only ever sees wire values. Runs strictly before
/// field mapping.
pub struct EnumCoercionPass;

impl EnumCoercionPass {
    pub fn apply(
        target: &RpcObjectType,
        raw: &Map<String, Value>,
        ctx: &SymbolContext,
        docs: &ParameterDocResolver<'_>,
    ) -> Result<Map<String, Value>, CoercionConflict> {
        let mut coerced = Map::with_capacity(raw.len());

        for (key, value) in raw {
            let rewritten = match target.get_field(key).map(|f| f.schema.unwrap_optional()) {
                Some(RpcTypeSchema::Enum { type_ref }) => {
                    match docs.enum_type(ctx, type_ref) {
                        Some(enum_type) => rewrite_by_name(value, enum_type),
                        None => None,
                    }
                }
                Some(RpcTypeSchema::Union { variants }) => {
                    rewrite_union(key, value, variants, ctx, docs)?
                }
                _ => None,
            };

            coerced.insert(key.clone(), rewritten.unwrap_or_else(|| value.clone()));
        }

        Ok(coerced)
    }
}

/// A string equal to a case name (ignoring case) becomes that case's backing
/// value. Only value-backed enums are rewritten; for name-only enums the
/// name already is the wire value.
fn rewrite_by_name(value: &Value, enum_type: &RpcEnumType) -> Option<Value> {
    if !enum_type.value_backed {
        return None;
    }
    let name = value.as_str()?;
    enum_type
        .variants
        .iter()
        .find(|(case, _)| case.eq_ignore_ascii_case(name))
        .map(|(_, backing)| backing.to_json())
}

fn rewrite_union(
    field: &str,
    value: &Value,
    variants: &[RpcTypeSchema],
    ctx: &SymbolContext,
    docs: &ParameterDocResolver<'_>,
) -> Result<Option<Value>, CoercionConflict> {
    let Some(name) = value.as_str() else {
        return Ok(None);
    };

    let claimants: Vec<&RpcEnumType> = variants
        .iter()
        .filter_map(|variant| match variant.unwrap_optional() {
            RpcTypeSchema::Enum { type_ref } => docs.enum_type(ctx, type_ref),
            _ => None,
        })
        .filter(|enum_type| {
            enum_type
                .case_names()
                .any(|case| case.eq_ignore_ascii_case(name))
        })
        .collect();

    match claimants.as_slice() {
        [] => Ok(None),
        [only] => Ok(rewrite_by_name(value, only)),
        many => Err(CoercionConflict {
            field: field.to_string(),
            types: many.iter().map(|e| e.name.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{EnumValue, RpcObjectField, SchemaMap};
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
        schemas.add_enum(RpcEnumType::backed(
            "hr.staff.ContractState",
            vec![
                ("ACTIVE", EnumValue::String("act".to_string())),
                ("ENDED", EnumValue::String("end".to_string())),
            ],
        ));
        schemas
    }

    fn target(field_schema: RpcTypeSchema) -> RpcObjectType {
        RpcObjectType::new("hr.staff.Employee")
            .with_field(RpcObjectField::new("status", field_schema))
    }

    #[test]
    fn case_name_becomes_backing_value() {
        let schemas = schemas();
        let docs = ParameterDocResolver::new(&schemas);
        let ctx = SymbolContext::new("hr.staff");
        let target = target(RpcTypeSchema::enum_ref("EmployeeStatus"));

        let raw = json!({"status": "active"}).as_object().unwrap().clone();
        let coerced = EnumCoercionPass::apply(&target, &raw, &ctx, &docs).unwrap();

        assert_eq!(coerced["status"], json!(1));
    }

    #[test]
    fn non_enum_fields_pass_untouched() {
        let schemas = schemas();
        let docs = ParameterDocResolver::new(&schemas);
        let ctx = SymbolContext::new("hr.staff");
        let target = target(RpcTypeSchema::enum_ref("EmployeeStatus"));

        let raw = json!({"status": 2, "name": "ACTIVE"})
            .as_object()
            .unwrap()
            .clone();
        let coerced = EnumCoercionPass::apply(&target, &raw, &ctx, &docs).unwrap();

        // Already a backing value; and "name" has no enum declaration
        assert_eq!(coerced["status"], json!(2));
        assert_eq!(coerced["name"], json!("ACTIVE"));
    }

    #[test]
    fn shared_case_name_in_union_is_a_conflict() {
        let schemas = schemas();
        let docs = ParameterDocResolver::new(&schemas);
        let ctx = SymbolContext::new("hr.staff");
        let target = target(RpcTypeSchema::union(vec![
            RpcTypeSchema::enum_ref("EmployeeStatus"),
            RpcTypeSchema::enum_ref("ContractState"),
        ]));

        let raw = json!({"status": "ACTIVE"}).as_object().unwrap().clone();
        let conflict = EnumCoercionPass::apply(&target, &raw, &ctx, &docs).unwrap_err();

        assert_eq!(conflict.field, "status");
        assert_eq!(
            conflict.types,
            vec!["hr.staff.EmployeeStatus", "hr.staff.ContractState"]
        );
    }

    #[test]
    fn unambiguous_union_case_is_rewritten() {
        let schemas = schemas();
        let docs = ParameterDocResolver::new(&schemas);
        let ctx = SymbolContext::new("hr.staff");
        let target = target(RpcTypeSchema::union(vec![
            RpcTypeSchema::enum_ref("EmployeeStatus"),
            RpcTypeSchema::enum_ref("ContractState"),
        ]));

        let raw = json!({"status": "ENDED"}).as_object().unwrap().clone();
        let coerced = EnumCoercionPass::apply(&target, &raw, &ctx, &docs).unwrap();

        assert_eq!(coerced["status"], json!("end"));
    }
}
