// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use common::context::RequestContext;
use core_model::{MethodDescriptor, SchemaMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::RegistryError;

/// The decoded JSON-RPC envelope of an execution request.
#[derive(Deserialize, Debug)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,

    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    /// Correlation id, echoed into the response when present
    #[serde(default)]
    pub id: Option<JsonRpcId>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

/// Any JSON value is admitted as a correlation id and echoed back verbatim.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct JsonRpcId(pub Value);

/// The outcome of a successful argument resolution: either named values in
/// declared parameter order, or the raw parameter map passed through
/// untouched (variadic bulk mode).
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArguments {
    Named(Vec<(String, Value)>),
    Bulk(Map<String, Value>),
}

impl ResolvedArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            ResolvedArguments::Named(values) => {
                values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            ResolvedArguments::Bulk(map) => map.get(name),
        }
    }

    pub fn into_object(self) -> Map<String, Value> {
        match self {
            ResolvedArguments::Named(values) => values.into_iter().collect(),
            ResolvedArguments::Bulk(map) => map,
        }
    }
}

/// An error thrown by a business handler. The numeric code lands in the
/// JSON-RPC `error.code` field (HTTP-exception status codes are conventional,
/// but any handler-defined code passes through).
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct MethodError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl MethodError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// One callable operation: its declarative descriptor plus the invocation
/// itself. Handlers receive already-resolved arguments and never see the raw
/// wire map (except in variadic bulk mode).
#[async_trait]
pub trait MethodHandler: Send + Sync {
    fn descriptor(&self) -> MethodDescriptor;

    async fn invoke(
        &self,
        args: ResolvedArguments,
        request_context: &RequestContext<'_>,
    ) -> Result<Value, MethodError>;
}

/// Contributes a batch of handlers (plus their named schemas) to the
/// registry. This is the explicit stand-in for attribute scanning: each
/// business area declares its operations once, next to their implementation.
pub trait MethodProvider: Send + Sync {
    /// Stable id, used as the registry's descriptor cache key
    fn id(&self) -> &'static str;

    fn methods(&self) -> Result<Vec<Arc<dyn MethodHandler>>, RegistryError>;

    fn schemas(&self) -> SchemaMap;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn any_json_id_is_preserved() {
        for id in [json!(-1), json!(2.5), json!("req-9"), json!({"trace": 7})] {
            let request: JsonRpcRequest = serde_json::from_value(json!({
                "method": "hr.staff.findEmployee",
                "params": {},
                "id": id,
            }))
            .unwrap();

            assert_eq!(request.id, Some(JsonRpcId(id)));
        }
    }

    #[test]
    fn omitted_id_stays_absent() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"method": "hr.staff.findEmployee"})).unwrap();

        assert!(request.id.is_none());
    }
}
