// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::http::{Headers, ResponseBody, ResponsePayload};
use async_trait::async_trait;
use http::StatusCode;

/// A router examines a request and either produces a response or declines
/// (returns `None`), letting the next router in a composite take over.
#[async_trait]
pub trait Router<RQ: Send + Sync>: Sync {
    async fn route(&self, request_context: &RQ) -> Option<ResponsePayload>;
}

#[async_trait]
impl<RQ: Send + Sync, R: Router<RQ> + ?Sized> Router<RQ> for Box<R> {
    async fn route(&self, request_context: &RQ) -> Option<ResponsePayload> {
        self.as_ref().route(request_context).await
    }
}

/// Tries each member in order; answers 404 when none claims the request.
pub struct CompositeRouter<R> {
    routers: Vec<R>,
}

impl<R> CompositeRouter<R> {
    pub fn new(routers: Vec<R>) -> Self {
        Self { routers }
    }
}

#[async_trait]
impl<RQ: Send + Sync, R: Router<RQ> + Send + Sync> Router<RQ> for CompositeRouter<R> {
    async fn route(&self, request_context: &RQ) -> Option<ResponsePayload> {
        for router in self.routers.iter() {
            if let Some(response) = router.route(request_context).await {
                return Some(response);
            }
        }

        Some(ResponsePayload {
            body: ResponseBody::None,
            headers: Headers::new(),
            status_code: StatusCode::NOT_FOUND,
        })
    }
}
