// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use core_resolver::MethodProvider;
use operon_env::Environment;
use system_router::{SystemRouter, SystemRouterError, create_system_router};

pub mod logging_tracing;

#[derive(Debug, thiserror::Error)]
pub enum ServerInitError {
    #[error(transparent)]
    Logging(#[from] logging_tracing::LoggingError),

    #[error(transparent)]
    Router(#[from] SystemRouterError),
}

/// Initialize the server by:
/// - Initializing tracing
/// - Building the system router over the given providers (and returning it)
pub fn init(
    providers: Vec<Box<dyn MethodProvider>>,
    env: Arc<dyn Environment>,
) -> Result<SystemRouter, ServerInitError> {
    logging_tracing::init()?;

    Ok(create_system_router(providers, env)?)
}

/// Providers statically linked into the server binary. Business crates
/// register their provider here to have their methods served.
pub fn create_static_providers() -> Vec<Box<dyn MethodProvider>> {
    vec![]
}
