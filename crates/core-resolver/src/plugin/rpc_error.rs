// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::{Value, json};
use thiserror::Error;

use crate::plugin::method_handler::MethodError;
use crate::violation::Violation;

/// Errors surfaced on the RPC path. They are always carried inside the
/// JSON-RPC `error` envelope (the HTTP status stays 200), with
/// HTTP-equivalent numeric codes.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid JSON")]
    ParseError,

    #[error("Internal error")]
    InternalError,

    #[error("Invalid JSON-RPC request")]
    InvalidRequest,

    #[error("Invalid method name: {0}")]
    MethodNotFound(String),

    #[error("Invalid parameters")]
    InvalidParams(Vec<Violation>),

    #[error("Not authorized")]
    Authorization,

    #[error("Ambiguous enum value for field {field}: case declared by {}", types.join(", "))]
    AmbiguousEnumValue { field: String, types: Vec<String> },

    #[error(transparent)]
    Method(#[from] MethodError),
}

impl RpcError {
    pub fn error_code(&self) -> i64 {
        match self {
            RpcError::ParseError => 400,
            RpcError::InvalidRequest => 400,
            RpcError::InvalidParams(_) => 400,
            RpcError::Authorization => 401,
            RpcError::MethodNotFound(_) => 404,
            RpcError::InternalError => 500,
            RpcError::AmbiguousEnumValue { .. } => 500,
            RpcError::Method(e) => e.code,
        }
    }

    pub fn user_error_message(&self) -> String {
        match self {
            RpcError::ParseError => "Invalid JSON".to_string(),
            RpcError::InternalError => "Internal error".to_string(),
            RpcError::InvalidRequest => "Invalid JSON-RPC request".to_string(),
            RpcError::MethodNotFound(method_name) => {
                format!("Method {method_name} not found")
            }
            RpcError::InvalidParams(_) => "Invalid parameters".to_string(),
            RpcError::Authorization => "Not authorized".to_string(),
            RpcError::AmbiguousEnumValue { .. } => self.to_string(),
            RpcError::Method(e) => e.message.clone(),
        }
    }

    /// Structured detail attached to the error envelope. Violations are
    /// always included; handler detail only outside production.
    pub fn error_data(&self, production: bool) -> Option<Value> {
        match self {
            RpcError::InvalidParams(violations) => Some(json!({ "violations": violations })),
            RpcError::Method(e) if !production => e.data.clone(),
            _ => None,
        }
    }
}
