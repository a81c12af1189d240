// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use operon_env::{EnvError, Environment};

pub const OPERON_SERVER_HOST: &str = "OPERON_SERVER_HOST";
pub const OPERON_SERVER_PORT: &str = "OPERON_SERVER_PORT";

pub const _OPERON_DEPLOYMENT_MODE: &str = "_OPERON_DEPLOYMENT_MODE"; // "dev" or "prod" (default)

pub const OPERON_RPC_HTTP_PATH: &str = "OPERON_RPC_HTTP_PATH";
pub const OPERON_MCP_HTTP_PATH: &str = "OPERON_MCP_HTTP_PATH";

pub const OPERON_ENABLE_MCP: &str = "OPERON_ENABLE_MCP";

// When enabled, the method registry rescans providers on every load (for
// local development with live editing).
pub const OPERON_LIVE_UPDATE: &str = "OPERON_LIVE_UPDATE";

pub const OPERON_LOCALE: &str = "OPERON_LOCALE";

pub const OPERON_MOCKS_FILE: &str = "OPERON_MOCKS_FILE";

#[derive(Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    Dev,
    Prod,
}

pub fn get_deployment_mode(env: &dyn Environment) -> Result<DeploymentMode, EnvError> {
    let deployment_mode = env.get(_OPERON_DEPLOYMENT_MODE);

    match deployment_mode.as_deref() {
        Some("dev") => Ok(DeploymentMode::Dev),
        Some("prod") | None => Ok(DeploymentMode::Prod),
        Some(other) => Err(EnvError::InvalidEnum {
            env_key: _OPERON_DEPLOYMENT_MODE,
            env_value: other.to_string(),
            message: "Must be one of 'dev' or 'prod'".to_string(),
        }),
    }
}

pub fn is_production(env: &dyn Environment) -> bool {
    matches!(get_deployment_mode(env), Ok(DeploymentMode::Prod) | Err(_))
}

pub fn get_rpc_http_path(env: &dyn Environment) -> String {
    env.get(OPERON_RPC_HTTP_PATH)
        .unwrap_or_else(|| "/rpc".to_string())
}

pub fn get_mcp_http_path(env: &dyn Environment) -> String {
    env.get(OPERON_MCP_HTTP_PATH)
        .unwrap_or_else(|| "/mcp".to_string())
}

pub fn get_locale(env: &dyn Environment) -> Option<String> {
    env.get(OPERON_LOCALE)
}

pub fn get_mocks_file(env: &dyn Environment) -> String {
    env.get(OPERON_MOCKS_FILE)
        .unwrap_or_else(|| "operon-mocks.json".to_string())
}
