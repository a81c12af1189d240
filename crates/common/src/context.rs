// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;

use crate::http::{RequestHead, RequestPayload};

/// Header carrying the caller identity established by the edge proxy. The
/// gateway consumes it only for capability checks; it performs no
/// authentication of its own.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Per-request state handed to routers. The body can be taken exactly once
/// (subsequent calls yield `Value::Null`).
pub struct RequestContext<'a> {
    request: &'a (dyn RequestPayload + Send + Sync),
}

impl<'a> RequestContext<'a> {
    pub fn new(request: &'a (dyn RequestPayload + Send + Sync)) -> Self {
        Self { request }
    }

    pub fn get_head(&self) -> &(dyn RequestHead + Send + Sync) {
        self.request.get_head()
    }

    pub fn take_body(&self) -> Value {
        self.request.take_body()
    }

    pub fn user_id(&self) -> Option<String> {
        self.get_head().get_header(USER_ID_HEADER)
    }
}
