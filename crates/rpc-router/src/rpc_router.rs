// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::{Value, json};

use common::{
    context::RequestContext,
    env_const::{get_locale, get_mocks_file, get_rpc_http_path, is_production},
    http::{Headers, ResponseBody, ResponsePayload},
    router::Router,
};
use core_resolver::{
    AllowAll, ArgumentResolver, CapabilityChecker, ConstraintValidator, DefaultValidator,
    JsonRpcId, JsonRpcRequest, MessageLocalizer, MethodRegistry, RpcError,
};
use operon_env::Environment;
use rpc_introspection::{FileOverlayStorage, MockOverlayStore};

use crate::spec::{SpecQuery, render_spec};

/// The single HTTP entry point of the gateway. GET renders a spec document,
/// POST executes one JSON-RPC call, other verbs get a 405 naming the allowed
/// set. Execution always answers HTTP 200; logical failures ride in the
/// envelope's `error` field so pipelined clients never branch on transport
/// status.
pub struct RpcRouter {
    registry: Arc<MethodRegistry>,
    capability_checker: Arc<dyn CapabilityChecker>,
    validator: Box<dyn ConstraintValidator>,
    localizer: MessageLocalizer,
    mocks: MockOverlayStore,
    api_path_prefix: String,
    production: bool,
}

impl RpcRouter {
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
            mocks: MockOverlayStore::new(Box::new(FileOverlayStorage::new(get_mocks_file(env)))),
            api_path_prefix: get_rpc_http_path(env),
            production: is_production(env),
        }
    }

    fn suitable(&self, request_context: &RequestContext<'_>) -> bool {
        request_context.get_head().get_path() == self.api_path_prefix
    }

    async fn execute(&self, request_context: &RequestContext<'_>) -> ResponsePayload {
        let body = request_context.take_body();
        if body.is_null() {
            return self.error_response(&RpcError::ParseError, None);
        }

        let request: JsonRpcRequest = match serde_json::from_value(body) {
            Ok(request) => request,
            Err(_) => return self.error_response(&RpcError::InvalidRequest, None),
        };
        let id = request.id.clone();

        match self.invoke(&request, request_context).await {
            Ok(result) => {
                ResponsePayload::json(&envelope(json!({ "result": result }), &id), StatusCode::OK)
            }
            Err(e) => self.error_response(&e, id),
        }
    }

    async fn invoke(
        &self,
        request: &JsonRpcRequest,
        request_context: &RequestContext<'_>,
    ) -> Result<Value, RpcError> {
        let handler = self
            .registry
            .lookup(&request.method)
            .ok_or_else(|| RpcError::MethodNotFound(request.method.clone()))?;
        let descriptor = handler.descriptor();

        if let Some(capability) = &descriptor.capability
            && !self
                .capability_checker
                .allowed(request_context.user_id().as_deref(), capability)
        {
            return Err(RpcError::Authorization);
        }

        let args = ArgumentResolver::resolve(
            &descriptor,
            request.params.as_ref(),
            self.validator.as_ref(),
            self.registry.named_schemas(),
            &self.localizer,
        )?;

        Ok(handler.invoke(args, request_context).await?)
    }

    fn error_response(&self, error: &RpcError, id: Option<JsonRpcId>) -> ResponsePayload {
        if error.error_code() >= 500 {
            tracing::error!("RPC execution failed: {error}");
        }

        let mut body = json!({
            "error": {
                "code": error.error_code(),
                "message": error.user_error_message(),
            }
        });
        if let Some(data) = error.error_data(self.production) {
            body["error"]["data"] = data;
        }

        ResponsePayload::json(&envelope(body, &id), StatusCode::OK)
    }
}

fn envelope(mut body: Value, id: &Option<JsonRpcId>) -> Value {
    body["jsonrpc"] = json!("2.0");
    if let Some(id) = id {
        body["id"] = json!(id);
    }
    body
}

#[async_trait]
impl<'a> Router<RequestContext<'a>> for RpcRouter {
    async fn route(&self, request_context: &RequestContext<'a>) -> Option<ResponsePayload> {
        if !self.suitable(request_context) {
            return None;
        }

        let head = request_context.get_head();
        match head.get_method() {
            Method::GET => {
                let query = SpecQuery::from_query(&head.get_query());
                Some(render_spec(
                    &self.registry,
                    &self.mocks,
                    &query,
                    &self.api_path_prefix,
                ))
            }
            Method::POST => Some(self.execute(request_context).await),
            _ => Some(ResponsePayload {
                body: ResponseBody::None,
                headers: Headers::from_vec(vec![("allow".to_string(), "GET, POST".to_string())]),
                status_code: StatusCode::METHOD_NOT_ALLOWED,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::http::RequestPayload;
    use common::test_support::TestRequestPayload;
    use core_resolver::test_support::fixture_providers;
    use operon_env::MapEnvironment;
    use serde_json::json;

    fn router(env: MapEnvironment) -> RpcRouter {
        let registry = MethodRegistry::build(fixture_providers(), &env).unwrap();
        RpcRouter::new(Arc::new(registry), &env)
    }

    fn mock_file_env() -> (tempfile::TempDir, MapEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mocks.json");
        let env = MapEnvironment::from([("OPERON_MOCKS_FILE", path.to_str().unwrap())]);
        (dir, env)
    }

    async fn respond(router: &RpcRouter, payload: TestRequestPayload) -> (StatusCode, Value) {
        let context = RequestContext::new(&payload);
        let response = router.route(&context).await.expect("router should match");
        let body = match response.body {
            ResponseBody::Bytes(bytes) => {
                serde_json::from_slice(&bytes).unwrap_or(Value::String(
                    String::from_utf8_lossy(&bytes).to_string(),
                ))
            }
            _ => Value::Null,
        };
        (response.status_code, body)
    }

    #[tokio::test]
    async fn successful_call_echoes_the_id() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, body) = respond(
            &router,
            TestRequestPayload::post(
                "/rpc",
                json!({
                    "jsonrpc": "2.0",
                    "method": "hr.staff.findEmployee",
                    "params": {"name": "Ada"},
                    "id": 42,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 42);
        assert_eq!(body["result"]["name"], "Ada");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn negative_and_fractional_ids_are_echoed() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        for id in [json!(-1), json!(2.5)] {
            let (status, body) = respond(
                &router,
                TestRequestPayload::post(
                    "/rpc",
                    json!({
                        "method": "hr.staff.findEmployee",
                        "params": {"name": "Ada"},
                        "id": id,
                    }),
                ),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["id"], id);
            assert!(body.get("error").is_none());
        }
    }

    #[tokio::test]
    async fn handler_error_rides_the_envelope_with_http_200() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, body) = respond(
            &router,
            TestRequestPayload::post(
                "/rpc",
                json!({
                    "method": "hr.staff.findEmployee",
                    "params": {"name": "Nobody"},
                    "id": "req-1",
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "req-1");
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "no employee named Nobody");
    }

    #[tokio::test]
    async fn unknown_method_is_a_404_equivalent() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, body) = respond(
            &router,
            TestRequestPayload::post("/rpc", json!({"method": "no.such.method"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], 404);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("no.such.method")
        );
    }

    #[tokio::test]
    async fn violations_are_aggregated_in_error_data() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, body) = respond(
            &router,
            TestRequestPayload::post(
                "/rpc",
                json!({"method": "hr.staff.createEmployee", "params": {"status": 1}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], 400);
        let violations = body["error"]["data"]["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0]["path"], "employee.name");
    }

    #[tokio::test]
    async fn other_verbs_get_405_with_allow_header() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let payload = TestRequestPayload::new(
            common::test_support::TestRequestHead {
                method: Method::DELETE,
                path: "/rpc".to_string(),
                query: Value::Null,
                headers: vec![],
            },
            Value::Null,
        );
        let context = RequestContext::new(&payload);
        let response = router.route(&context).await.unwrap();

        assert_eq!(response.status_code, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers.get("allow").as_deref(), Some("GET, POST"));
    }

    #[tokio::test]
    async fn non_rpc_paths_are_declined() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let payload = TestRequestPayload::post("/graphql", json!({}));
        let context = RequestContext::new(&payload);

        assert!(router.route(&context).await.is_none());
    }

    #[tokio::test]
    async fn get_renders_the_openrpc_spec_by_default() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, body) =
            respond(&router, TestRequestPayload::get("/rpc", Value::Null)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["openrpc"], "1.3.2");
        let names: Vec<&str> = body["methods"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"events.rewards.getCountryList"));
        assert!(names.contains(&"hr.staff.createEmployee"));
    }

    #[tokio::test]
    async fn tag_filter_narrows_the_spec() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::get("/rpc", json!({"tags": "rewards"})),
        )
        .await;

        let methods = body["methods"].as_array().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0]["name"], "events.rewards.getCountryList");
    }

    #[tokio::test]
    async fn postman_spec_type() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::get("/rpc", json!({"specType": "postman", "tags": "rewards"})),
        )
        .await;

        assert_eq!(body["item"][0]["name"], "[Q] events.rewards.getCountryList");
    }

    #[tokio::test]
    async fn unknown_spec_type_is_a_400() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (status, _) = respond(
            &router,
            TestRequestPayload::get("/rpc", json!({"specType": "swagger"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn capability_check_blocks_unauthorized_callers() {
        struct DenyWrites;
        impl CapabilityChecker for DenyWrites {
            fn allowed(&self, _user_id: Option<&str>, capability: &str) -> bool {
                capability != "hr.write"
            }
        }

        let (_dir, env) = mock_file_env();
        let registry = MethodRegistry::build(fixture_providers(), &env).unwrap();
        let router =
            RpcRouter::with_capability_checker(Arc::new(registry), &env, Arc::new(DenyWrites));

        let (status, body) = respond(
            &router,
            TestRequestPayload::post(
                "/rpc",
                json!({"method": "hr.staff.createEmployee", "params": {"name": "Ada", "status": 1}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], 401);
    }

    #[tokio::test]
    async fn ambiguous_enum_case_fails_fast_naming_both_types() {
        let (_dir, env) = mock_file_env();
        let router = router(env);

        let (_, body) = respond(
            &router,
            TestRequestPayload::post(
                "/rpc",
                json!({"method": "hr.staff.updateBadge", "params": {"badge": {"state": "ACTIVE"}}}),
            ),
        )
        .await;

        assert_eq!(body["error"]["code"], 500);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("state"));
        assert!(message.contains("hr.staff.EmployeeStatus"));
        assert!(message.contains("hr.staff.BadgeState"));
    }

    #[tokio::test]
    async fn include_mocks_merges_the_overlay() {
        let (_dir, env) = mock_file_env();
        let mocks = MockOverlayStore::new(Box::new(FileOverlayStorage::new(get_mocks_file(&env))));
        mocks
            .add_mock(
                "hr.staff.findEmployee",
                json!({"name": "Grace", "status": 1, "hiredAt": null}),
                &indexmap::IndexMap::from([("name".to_string(), json!("Grace"))]),
            )
            .unwrap();

        let router = router(env);
        let (_, body) = respond(
            &router,
            TestRequestPayload::get(
                "/rpc",
                json!({"method": "hr.staff.findEmployee", "includeMocks": "true"}),
            ),
        )
        .await;

        let examples = body["methods"][0]["examples"].as_array().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0]["name"], "found");
        assert_eq!(examples[1]["name"], "[MOCK] 1");
    }
}
