// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! In-memory request payloads for exercising routers without an HTTP server.

use std::sync::Mutex;

use serde_json::Value;

use crate::http::{RequestHead, RequestPayload};

pub struct TestRequestHead {
    pub method: http::Method,
    pub path: String,
    pub query: Value,
    pub headers: Vec<(String, String)>,
}

impl RequestHead for TestRequestHead {
    fn get_headers(&self, key: &str) -> Vec<String> {
        let key = key.to_lowercase();
        self.headers
            .iter()
            .filter(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn get_path(&self) -> String {
        self.path.clone()
    }

    fn get_query(&self) -> Value {
        self.query.clone()
    }

    fn get_method(&self) -> http::Method {
        self.method.clone()
    }
}

pub struct TestRequestPayload {
    head: TestRequestHead,
    body: Mutex<Value>,
}

impl TestRequestPayload {
    pub fn new(head: TestRequestHead, body: Value) -> Self {
        Self {
            head,
            body: Mutex::new(body),
        }
    }

    pub fn post(path: &str, body: Value) -> Self {
        Self::new(
            TestRequestHead {
                method: http::Method::POST,
                path: path.to_string(),
                query: Value::Null,
                headers: vec![],
            },
            body,
        )
    }

    pub fn get(path: &str, query: Value) -> Self {
        Self::new(
            TestRequestHead {
                method: http::Method::GET,
                path: path.to_string(),
                query,
                headers: vec![],
            },
            Value::Null,
        )
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.head.headers.push((key.to_string(), value.to_string()));
        self
    }
}

impl RequestPayload for TestRequestPayload {
    fn get_head(&self) -> &(dyn RequestHead + Send + Sync) {
        &self.head
    }

    fn take_body(&self) -> Value {
        self.body.lock().unwrap().take()
    }
}
