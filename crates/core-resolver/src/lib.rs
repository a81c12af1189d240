// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Method discovery and argument resolution.
//!
//! The registry inventories every declared operation; the argument resolver
//! converts an untyped JSON parameter map into validated values for one
//! invocation, aggregating all violations instead of failing on the first.

pub mod capability;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod validator;
pub mod violation;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use capability::{AllowAll, CapabilityChecker};
pub use plugin::method_handler::{
    JsonRpcId, JsonRpcRequest, MethodError, MethodHandler, MethodProvider, ResolvedArguments,
};
pub use plugin::rpc_error::RpcError;
pub use registry::{MethodRegistry, RegistryError};
pub use resolver::ArgumentResolver;
pub use resolver::localizer::MessageLocalizer;
pub use validator::{ConstraintValidator, DefaultValidator};
pub use violation::Violation;
