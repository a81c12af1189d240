// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod system_router;

pub use system_router::{
    SystemRouter, SystemRouterError, create_system_router,
    create_system_router_with_capability_checker,
};
