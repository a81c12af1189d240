// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use common::context::RequestContext;
use common::env_const::OPERON_ENABLE_MCP;
use common::http::{RequestPayload, ResponsePayload};
use common::router::{CompositeRouter, Router};
use core_resolver::{
    AllowAll, CapabilityChecker, MethodProvider, MethodRegistry, RegistryError,
};
use mcp_router::McpRouter;
use operon_env::{EnvError, Environment};
use rpc_router::RpcRouter;

#[derive(Debug, thiserror::Error)]
pub enum SystemRouterError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

type RequestContextRouter = Box<dyn for<'a> Router<RequestContext<'a>> + Send + Sync>;

/// The fully assembled gateway: one registry shared by the RPC endpoint and
/// (in dev mode, when enabled) the MCP endpoint.
pub struct SystemRouter {
    underlying: CompositeRouter<RequestContextRouter>,
}

pub fn create_system_router(
    providers: Vec<Box<dyn MethodProvider>>,
    env: Arc<dyn Environment>,
) -> Result<SystemRouter, SystemRouterError> {
    create_system_router_with_capability_checker(providers, env, Arc::new(AllowAll))
}

pub fn create_system_router_with_capability_checker(
    providers: Vec<Box<dyn MethodProvider>>,
    env: Arc<dyn Environment>,
    capability_checker: Arc<dyn CapabilityChecker>,
) -> Result<SystemRouter, SystemRouterError> {
    let registry = Arc::new(MethodRegistry::build(providers, env.as_ref())?);

    let mut routers: Vec<RequestContextRouter> = vec![Box::new(
        RpcRouter::with_capability_checker(registry.clone(), env.as_ref(), capability_checker.clone()),
    )];

    if env.enabled(OPERON_ENABLE_MCP, true)? {
        routers.push(Box::new(McpRouter::with_capability_checker(
            registry,
            env.as_ref(),
            capability_checker,
        )));
    }

    Ok(SystemRouter {
        underlying: CompositeRouter::new(routers),
    })
}

impl SystemRouter {
    /// Routes a raw request, answering 404 when no endpoint claims the path.
    pub async fn route_request(
        &self,
        request: &(dyn RequestPayload + Send + Sync),
    ) -> Option<ResponsePayload> {
        let request_context = RequestContext::new(request);
        self.underlying.route(&request_context).await
    }
}

#[async_trait::async_trait]
impl<'a> Router<RequestContext<'a>> for SystemRouter {
    async fn route(&self, request_context: &RequestContext<'a>) -> Option<ResponsePayload> {
        self.underlying.route(request_context).await
    }
}
