// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The declarative model of the API: method descriptors, parameter shapes,
//! named object/enum declarations, and validation constraints.
//!
//! Descriptors are built once per process by method providers and treated as
//! immutable afterwards; everything else in the system (argument resolution,
//! spec rendering, the MCP bridge) consumes this model read-only.

pub mod method;
pub mod schema;
pub mod types;

pub use method::{
    MethodDescriptor, MethodErrorDoc, MethodExample, ParamDescriptor, ResultDescriptor,
    SymbolContext,
};
pub use schema::{EnumValue, RpcEnumType, RpcObjectField, RpcObjectType, RpcTypeSchema, SchemaMap};
pub use types::{FloatConstraints, IntConstraints, StringConstraints, TypeValidation};
