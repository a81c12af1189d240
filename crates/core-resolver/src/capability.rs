// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// The authorization seam. Permission evaluation happens outside the
/// gateway; the gateway only asks "may this user invoke methods carrying
/// this capability tag".
pub trait CapabilityChecker: Send + Sync {
    fn allowed(&self, user_id: Option<&str>, capability: &str) -> bool;
}

/// Grants everything. The default for deployments where the edge proxy
/// already enforces access.
pub struct AllowAll;

impl CapabilityChecker for AllowAll {
    fn allowed(&self, _user_id: Option<&str>, _capability: &str) -> bool {
        true
    }
}
