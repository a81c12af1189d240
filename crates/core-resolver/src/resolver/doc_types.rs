// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::{RpcEnumType, RpcObjectType, SchemaMap, SymbolContext};

/// Resolves type references from parameter documentation against the named
/// schema map. References are qualified through the declaring handler's
/// symbol context first (dotted names as-is, then import aliases, then the
/// declaring namespace); a bare lookup is the last resort for types declared
/// outside any namespace.
pub struct ParameterDocResolver<'a> {
    schemas: &'a SchemaMap,
}

impl<'a> ParameterDocResolver<'a> {
    pub fn new(schemas: &'a SchemaMap) -> Self {
        Self { schemas }
    }

    pub fn object_type(&self, ctx: &SymbolContext, type_ref: &str) -> Option<&'a RpcObjectType> {
        self.schemas
            .get_object(&ctx.qualify(type_ref))
            .or_else(|| self.schemas.get_object(type_ref))
    }

    pub fn enum_type(&self, ctx: &SymbolContext, type_ref: &str) -> Option<&'a RpcEnumType> {
        self.schemas
            .get_enum(&ctx.qualify(type_ref))
            .or_else(|| self.schemas.get_enum(type_ref))
    }
}
