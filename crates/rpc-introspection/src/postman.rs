// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Postman collection rendering.
//!
//! One request item per method. Read-only methods are titled `[Q] <name>`,
//! everything else `[C] <name>`, so a collection sorts queries and commands
//! apart at a glance.

use core_model::MethodDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const COLLECTION_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: CollectionInfo,
    pub item: Vec<RequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    pub request: Request,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub header: Vec<Header>,
    pub body: RequestBody,
    pub url: RequestUrl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    pub mode: String,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestUrl {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
}

/// Render a Postman collection over the descriptor list. `rpc_path` is the
/// single endpoint every request posts to.
pub fn to_postman(
    descriptors: &[MethodDescriptor],
    title: &str,
    rpc_path: &str,
) -> PostmanCollection {
    PostmanCollection {
        info: CollectionInfo {
            name: title.to_string(),
            schema: COLLECTION_SCHEMA.to_string(),
        },
        item: descriptors.iter().map(|d| request_item(d, rpc_path)).collect(),
    }
}

fn request_item(descriptor: &MethodDescriptor, rpc_path: &str) -> RequestItem {
    let marker = if descriptor.read_only { "[Q]" } else { "[C]" };

    let params: Map<String, Value> = descriptor
        .examples
        .values()
        .next()
        .map(|example| {
            example
                .params
                .iter()
                .map(|(name, value)| (name.clone(), expand_json_string(value)))
                .collect()
        })
        .unwrap_or_default();

    let envelope = json!({
        "jsonrpc": "2.0",
        "method": descriptor.name,
        "params": params,
        "id": 1,
    });
    // Envelope keys are fixed; pretty-printing cannot fail
    let raw = serde_json::to_string_pretty(&envelope).unwrap_or_default();

    let path_segments: Vec<String> = rpc_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    RequestItem {
        name: format!("{marker} {}", descriptor.name),
        request: Request {
            method: "POST".to_string(),
            header: vec![Header {
                key: "Content-Type".to_string(),
                value: "application/json".to_string(),
            }],
            body: RequestBody {
                mode: "raw".to_string(),
                raw,
            },
            url: RequestUrl {
                raw: format!("{{{{baseUrl}}}}{rpc_path}"),
                host: vec!["{{baseUrl}}".to_string()],
                path: path_segments,
            },
        },
    }
}

/// Example values are sometimes authored as JSON embedded in a string. When
/// a string value decodes to a structure, substitute the decoded form.
fn expand_json_string(value: &Value) -> Value {
    if let Value::String(raw) = value
        && let Ok(decoded) = serde_json::from_str::<Value>(raw)
        && (decoded.is_object() || decoded.is_array())
    {
        return decoded;
    }
    value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{MethodExample, ResultDescriptor, RpcTypeSchema};
    use indexmap::IndexMap;
    use serde_json::json;

    fn descriptors() -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new(
                "events.rewards.getCountryList",
                ResultDescriptor::new(RpcTypeSchema::scalar("Json")),
            )
            .read_only(),
            MethodDescriptor::new(
                "hr.staff.createEmployee",
                ResultDescriptor::new(RpcTypeSchema::scalar("Int")),
            )
            .with_example(
                "minimal",
                MethodExample::new(
                    IndexMap::from([
                        ("name".to_string(), json!("Ada")),
                        ("profile".to_string(), json!("{\"team\": \"platform\"}")),
                    ]),
                    json!(7),
                ),
            ),
        ]
    }

    #[test]
    fn read_only_marker() {
        let collection = to_postman(&descriptors(), "Operon", "/rpc");

        assert_eq!(collection.item[0].name, "[Q] events.rewards.getCountryList");
        assert_eq!(collection.item[1].name, "[C] hr.staff.createEmployee");
    }

    #[test]
    fn body_comes_from_first_example_with_json_strings_expanded() {
        let collection = to_postman(&descriptors(), "Operon", "/rpc");

        let body: Value = serde_json::from_str(&collection.item[1].request.body.raw).unwrap();
        assert_eq!(body["method"], "hr.staff.createEmployee");
        assert_eq!(body["params"]["name"], "Ada");
        // The embedded JSON string is decoded into a structure
        assert_eq!(body["params"]["profile"]["team"], "platform");
    }

    #[test]
    fn methods_without_examples_get_empty_params() {
        let collection = to_postman(&descriptors(), "Operon", "/rpc");

        let body: Value = serde_json::from_str(&collection.item[0].request.body.raw).unwrap();
        assert_eq!(body["params"], json!({}));
    }
}
