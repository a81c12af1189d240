// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::{Value, json};

use common::{
    context::RequestContext,
    env_const::{get_locale, get_mcp_http_path, is_production},
    http::{Headers, ResponseBody, ResponsePayload},
    router::Router,
};
use core_resolver::{
    AllowAll, ArgumentResolver, CapabilityChecker, ConstraintValidator, DefaultValidator,
    JsonRpcId, JsonRpcRequest, MessageLocalizer, MethodRegistry, RpcError,
};
use operon_env::Environment;

use crate::tool_schema::input_schema;

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SESSION_ID_HEADER: &str = "mcp-session-id";

const JSONRPC_METHOD_NOT_FOUND: i32 = -32601;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Exposes every registered method as an MCP tool so local agent clients can
/// discover and call the API. The endpoint is a development aid and refuses
/// to serve outside dev mode.
pub struct McpRouter {
    registry: Arc<MethodRegistry>,
    capability_checker: Arc<dyn CapabilityChecker>,
    validator: Box<dyn ConstraintValidator>,
    localizer: MessageLocalizer,
    api_path_prefix: String,
    dev_mode: bool,
}

enum McpOutcome {
    Result(Value),
    Error { code: i32, message: String },
    /// Notifications are acknowledged without a response body
    Accepted,
}

impl McpRouter {
    pub fn new(registry: Arc<MethodRegistry>, env: &dyn Environment) -> Self {
        Self::with_capability_checker(registry, env, Arc::new(AllowAll))
    }

    pub fn with_capability_checker(
        registry: Arc<MethodRegistry>,
        env: &dyn Environment,
        capability_checker: Arc<dyn CapabilityChecker>,
    ) -> Self {
        let localizer = match get_locale(env) {
            Some(locale) => MessageLocalizer::for_locale(&locale),
            None => MessageLocalizer::passthrough(),
        };

        Self {
            registry,
            capability_checker,
            validator: Box::new(DefaultValidator),
            localizer,
            api_path_prefix: get_mcp_http_path(env),
            dev_mode: !is_production(env),
        }
    }

    fn suitable(&self, request_context: &RequestContext<'_>) -> bool {
        let head = request_context.get_head();
        head.get_path() == self.api_path_prefix && head.get_method() == Method::POST
    }

    async fn process(&self, request_context: &RequestContext<'_>) -> ResponsePayload {
        let body = request_context.take_body();
        if body.is_null() {
            return error_payload(-32700, "Invalid JSON", &None);
        }

        let request: JsonRpcRequest = match serde_json::from_value(body) {
            Ok(request) => request,
            Err(_) => return error_payload(-32600, "Invalid JSON-RPC request", &None),
        };
        if request.jsonrpc != "2.0" {
            return error_payload(-32600, "Invalid JSON-RPC version", &request.id);
        }

        let mut headers = Headers::from_vec(vec![(
            "content-type".to_string(),
            "application/json".to_string(),
        )]);
        match self.session_header(request_context, &request.method) {
            Some(session_id) => headers.insert(SESSION_ID_HEADER.to_string(), session_id),
            None => return error_payload(-32600, "Missing Mcp-Session-Id header", &request.id),
        }

        let outcome = self.dispatch(&request, request_context).await;
        match outcome {
            McpOutcome::Accepted => ResponsePayload {
                body: ResponseBody::None,
                headers,
                status_code: StatusCode::ACCEPTED,
            },
            McpOutcome::Result(result) => ResponsePayload {
                body: stream_message(json!({"result": result}), request.id),
                headers,
                status_code: StatusCode::OK,
            },
            McpOutcome::Error { code, message } => ResponsePayload {
                body: stream_message(
                    json!({"error": {"code": code, "message": message}}),
                    request.id,
                ),
                headers,
                status_code: StatusCode::OK,
            },
        }
    }

    /// `initialize` mints a fresh session id; every later message must carry
    /// it back. Sessions hold no server-side state, the id exists so clients
    /// exercise the full MCP handshake.
    fn session_header(
        &self,
        request_context: &RequestContext<'_>,
        method: &str,
    ) -> Option<String> {
        if method == "initialize" {
            let discriminator = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
            return Some(format!(
                "{:x}-{:x}",
                chrono::Utc::now().timestamp_micros(),
                discriminator
            ));
        }
        request_context.get_head().get_header(SESSION_ID_HEADER)
    }

    async fn dispatch(
        &self,
        request: &JsonRpcRequest,
        request_context: &RequestContext<'_>,
    ) -> McpOutcome {
        match request.method.as_str() {
            "initialize" => McpOutcome::Result(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                },
                "serverInfo": {
                    "name": "Operon",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "notifications/initialized" | "notifications/cancelled" => McpOutcome::Accepted,
            "tools/list" => self.tools_list(),
            "tools/call" => self.tools_call(request, request_context).await,
            "prompts/list" => McpOutcome::Result(json!({ "prompts": [] })),
            "resources/list" => McpOutcome::Result(json!({ "resources": [] })),
            other => McpOutcome::Error {
                code: JSONRPC_METHOD_NOT_FOUND,
                message: format!("Method {other} not found"),
            },
        }
    }

    fn tools_list(&self) -> McpOutcome {
        let descriptors = match self.registry.load() {
            Ok(descriptors) => descriptors,
            Err(e) => {
                tracing::error!("Method discovery failed: {e}");
                return McpOutcome::Error {
                    code: -32603,
                    message: "Internal error".to_string(),
                };
            }
        };

        let schemas = self.registry.named_schemas();
        let tools: Vec<Value> = descriptors
            .iter()
            .map(|descriptor| {
                let description = descriptor
                    .description
                    .as_deref()
                    .or(descriptor.summary.as_deref())
                    .unwrap_or(&descriptor.name);
                json!({
                    "name": descriptor.name,
                    "description": description,
                    "inputSchema": input_schema(descriptor, schemas),
                })
            })
            .collect();

        McpOutcome::Result(json!({ "tools": tools }))
    }

    async fn tools_call(
        &self,
        request: &JsonRpcRequest,
        request_context: &RequestContext<'_>,
    ) -> McpOutcome {
        let params = request.params.as_ref().unwrap_or(&Value::Null);
        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return McpOutcome::Error {
                code: -32602,
                message: "Missing tool name".to_string(),
            };
        };

        let Some(handler) = self.registry.lookup(tool_name) else {
            return McpOutcome::Error {
                code: -32602,
                message: format!("Unknown tool {tool_name}"),
            };
        };
        let descriptor = handler.descriptor();

        if let Some(capability) = &descriptor.capability
            && !self
                .capability_checker
                .allowed(request_context.user_id().as_deref(), capability)
        {
            return McpOutcome::Error {
                code: -32000,
                message: "Not authorized".to_string(),
            };
        }

        let arguments = params.get("arguments");
        let invocation = async {
            let args = ArgumentResolver::resolve(
                &descriptor,
                arguments,
                self.validator.as_ref(),
                self.registry.named_schemas(),
                &self.localizer,
            )?;
            Ok::<_, RpcError>(handler.invoke(args, request_context).await?)
        };

        match invocation.await {
            Ok(result) => McpOutcome::Result(tool_result(&result, false)),
            // Business failures surface as tool output so the agent can
            // read and react to them; only protocol failures above use the
            // JSON-RPC error member.
            Err(e) => {
                if e.error_code() >= 500 {
                    tracing::error!("Tool call failed: {e}");
                }
                let mut text = e.user_error_message();
                if let Some(data) = e.error_data(false) {
                    text = format!("{text}\n{data}");
                }
                McpOutcome::Result(tool_result(&Value::String(text), true))
            }
        }
    }
}

fn tool_result(value: &Value, is_error: bool) -> Value {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

/// One JSON-RPC message, emitted as a byte stream so large tool results do
/// not get buffered twice.
fn stream_message(mut body: Value, id: Option<JsonRpcId>) -> ResponseBody {
    body["jsonrpc"] = json!("2.0");
    if let Some(id) = id {
        body["id"] = json!(id);
    }

    let stream = try_stream! {
        let bytes = serde_json::to_vec(&body).map_err(std::io::Error::other)?;
        yield Bytes::from(bytes);
    };

    ResponseBody::Stream(Box::pin(stream))
}

fn error_payload(code: i32, message: &str, id: &Option<JsonRpcId>) -> ResponsePayload {
    ResponsePayload {
        body: stream_message(
            json!({"error": {"code": code, "message": message}}),
            id.clone(),
        ),
        headers: Headers::from_vec(vec![(
            "content-type".to_string(),
            "application/json".to_string(),
        )]),
        status_code: StatusCode::OK,
    }
}

#[async_trait]
impl<'a> Router<RequestContext<'a>> for McpRouter {
    async fn route(&self, request_context: &RequestContext<'a>) -> Option<ResponsePayload> {
        if !self.suitable(request_context) {
            return None;
        }

        if !self.dev_mode {
            return Some(ResponsePayload::json(
                &json!({"error": "The MCP endpoint is available in local development only"}),
                StatusCode::UNAUTHORIZED,
            ));
        }

        Some(self.process(request_context).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_support::{TestRequestHead, TestRequestPayload};
    use core_resolver::test_support::fixture_providers;
    use futures::StreamExt;
    use operon_env::MapEnvironment;

    fn dev_env() -> MapEnvironment {
        MapEnvironment::from([("_OPERON_DEPLOYMENT_MODE", "dev")])
    }

    fn router(env: &MapEnvironment) -> McpRouter {
        let registry = MethodRegistry::build(fixture_providers(), env).unwrap();
        McpRouter::new(Arc::new(registry), env)
    }

    async fn respond(router: &McpRouter, payload: TestRequestPayload) -> (ResponsePayload, Value) {
        let context = RequestContext::new(&payload);
        let response = router.route(&context).await.expect("router should match");
        let body = read_body(response.body).await;
        (
            ResponsePayload {
                body: ResponseBody::None,
                headers: response.headers,
                status_code: response.status_code,
            },
            body,
        )
    }

    async fn read_body(body: ResponseBody) -> Value {
        match body {
            ResponseBody::Stream(mut stream) => {
                let mut buf = Vec::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk.unwrap());
                }
                serde_json::from_slice(&buf).unwrap()
            }
            ResponseBody::Bytes(bytes) => serde_json::from_slice(&bytes).unwrap(),
            ResponseBody::None => Value::Null,
        }
    }

    #[tokio::test]
    async fn initialize_issues_a_session_id() {
        let env = dev_env();
        let router = router(&env);

        let (response, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "initialize", "id": 1}),
            ),
        )
        .await;

        assert_eq!(response.status_code, StatusCode::OK);
        assert!(response.headers.get("mcp-session-id").is_some());
        assert_eq!(body["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(body["result"]["serverInfo"]["name"], "Operon");
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn production_mode_refuses_with_401() {
        let env = MapEnvironment::from([("_OPERON_DEPLOYMENT_MODE", "prod")]);
        let router = router(&env);

        let payload = TestRequestPayload::post(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "initialize", "id": 1}),
        );
        let context = RequestContext::new(&payload);
        let response = router.route(&context).await.unwrap();

        assert_eq!(response.status_code, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_post_verbs_are_declined() {
        let env = dev_env();
        let router = router(&env);

        let payload = TestRequestPayload::new(
            TestRequestHead {
                method: Method::GET,
                path: "/mcp".to_string(),
                query: Value::Null,
                headers: vec![],
            },
            Value::Null,
        );
        let context = RequestContext::new(&payload);

        assert!(router.route(&context).await.is_none());
    }

    #[tokio::test]
    async fn requests_without_a_session_are_rejected() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "tools/list", "id": 2}),
            ),
        )
        .await;

        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn tools_list_exposes_every_method() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "tools/list", "id": 2}),
            )
            .with_header(SESSION_ID_HEADER, "abc"),
        )
        .await;

        let tools = body["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"events.rewards.getCountryList"));
        assert!(names.contains(&"hr.staff.findEmployee"));
        let find = tools
            .iter()
            .find(|t| t["name"] == "hr.staff.findEmployee")
            .unwrap();
        assert_eq!(find["inputSchema"]["required"], json!(["name"]));
    }

    #[tokio::test]
    async fn tools_call_round_trip() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({
                    "jsonrpc": "2.0",
                    "method": "tools/call",
                    "params": {
                        "name": "hr.staff.findEmployee",
                        "arguments": {"name": "Ada"},
                    },
                    "id": 3,
                }),
            )
            .with_header(SESSION_ID_HEADER, "abc"),
        )
        .await;

        assert_eq!(body["id"], 3);
        assert_eq!(body["result"]["isError"], false);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        let result: Value = serde_json::from_str(text).unwrap();
        assert_eq!(result["name"], "Ada");
    }

    #[tokio::test]
    async fn handler_errors_surface_as_tool_output() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({
                    "jsonrpc": "2.0",
                    "method": "tools/call",
                    "params": {
                        "name": "hr.staff.findEmployee",
                        "arguments": {"name": "Nobody"},
                    },
                    "id": 4,
                }),
            )
            .with_header(SESSION_ID_HEADER, "abc"),
        )
        .await;

        assert_eq!(body["result"]["isError"], true);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("no employee named Nobody"));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_protocol_error() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({
                    "jsonrpc": "2.0",
                    "method": "tools/call",
                    "params": {"name": "no.such.tool", "arguments": {}},
                    "id": 5,
                }),
            )
            .with_header(SESSION_ID_HEADER, "abc"),
        )
        .await;

        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn unknown_mcp_method() {
        let env = dev_env();
        let router = router(&env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "tools/subscribe", "id": 6}),
            )
            .with_header(SESSION_ID_HEADER, "abc"),
        )
        .await;

        assert_eq!(body["error"]["code"], JSONRPC_METHOD_NOT_FOUND);
    }
}
