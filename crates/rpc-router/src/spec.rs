// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use http::StatusCode;
use serde_json::Value;

use common::http::{Headers, ResponseBody, ResponsePayload};
use core_resolver::MethodRegistry;
use rpc_introspection::{MockOverlayStore, to_jsight, to_openrpc, to_postman};

const SPEC_TITLE: &str = "Operon API";
const SPEC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query parameters recognized on the spec (GET) path.
pub(crate) struct SpecQuery {
    pub spec_type: String,
    pub tags: Vec<String>,
    pub method: Option<String>,
    pub include_mocks: bool,
}

impl SpecQuery {
    pub fn from_query(query: &Value) -> Self {
        let str_param = |name: &str| {
            query
                .get(name)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        Self {
            spec_type: str_param("specType").unwrap_or_else(|| "openRpc".to_string()),
            tags: str_param("tags")
                .map(|tags| {
                    tags.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            method: str_param("method"),
            include_mocks: str_param("includeMocks").as_deref() == Some("true"),
        }
    }
}

/// Render the requested spec document. Every request renders fresh; the
/// registry's descriptor cache is the only persisted state.
pub(crate) fn render_spec(
    registry: &MethodRegistry,
    mocks: &MockOverlayStore,
    query: &SpecQuery,
    rpc_path: &str,
) -> ResponsePayload {
    let descriptors = match registry.load_with_filter(&query.tags, query.method.as_deref()) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            tracing::error!("Method discovery failed: {e}");
            return ResponsePayload {
                body: ResponseBody::None,
                headers: Headers::new(),
                status_code: StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
    };

    match query.spec_type.as_str() {
        "openRpc" => {
            let doc = to_openrpc(
                &descriptors,
                registry.named_schemas(),
                SPEC_TITLE,
                SPEC_VERSION,
                Some(rpc_path),
            );
            let doc = if query.include_mocks {
                match mocks.build(doc, query.method.as_deref()) {
                    Ok(doc) => doc,
                    Err(e) => {
                        tracing::error!("Mock overlay merge failed: {e}");
                        return ResponsePayload {
                            body: ResponseBody::None,
                            headers: Headers::new(),
                            status_code: StatusCode::INTERNAL_SERVER_ERROR,
                        };
                    }
                }
            } else {
                doc
            };
            json_document(&doc)
        }
        "postman" => json_document(&to_postman(&descriptors, SPEC_TITLE, rpc_path)),
        "jSight" => {
            let text = to_jsight(&descriptors, SPEC_TITLE, SPEC_VERSION, rpc_path);
            ResponsePayload {
                body: ResponseBody::Bytes(text.into_bytes()),
                headers: Headers::from_vec(vec![(
                    "content-type".to_string(),
                    "text/plain; charset=utf-8".to_string(),
                )]),
                status_code: StatusCode::OK,
            }
        }
        other => ResponsePayload::json(
            &serde_json::json!({
                "error": format!(
                    "Unknown specType {other}; expected openRpc, postman, or jSight"
                )
            }),
            StatusCode::BAD_REQUEST,
        ),
    }
}

fn json_document<T: serde::Serialize>(document: &T) -> ResponsePayload {
    match serde_json::to_value(document) {
        Ok(value) => ResponsePayload::json(&value, StatusCode::OK),
        Err(e) => {
            tracing::error!("Spec serialization failed: {e}");
            ResponsePayload {
                body: ResponseBody::None,
                headers: Headers::new(),
                status_code: StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_defaults() {
        let query = SpecQuery::from_query(&Value::Null);

        assert_eq!(query.spec_type, "openRpc");
        assert!(query.tags.is_empty());
        assert!(query.method.is_none());
        assert!(!query.include_mocks);
    }

    #[test]
    fn query_parsing() {
        let query = SpecQuery::from_query(&json!({
            "specType": "postman",
            "tags": "hr, rewards",
            "method": "hr.staff.findEmployee",
            "includeMocks": "true",
        }));

        assert_eq!(query.spec_type, "postman");
        assert_eq!(query.tags, vec!["hr", "rewards"]);
        assert_eq!(query.method.as_deref(), Some("hr.staff.findEmployee"));
        assert!(query.include_mocks);
    }
}
