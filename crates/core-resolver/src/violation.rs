// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;

/// One parameter-resolution or validation failure: the path to the offending
/// value (e.g. `items[2].status`), a human message, and the root the path is
/// anchored at (the method name for top-level parameters, the DTO type name
/// for nested mapping failures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
    pub root: String,
}

impl Violation {
    pub fn new(
        path: impl Into<String>,
        message: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            root: root.into(),
        }
    }
}
