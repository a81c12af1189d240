// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Spec rendering for the RPC gateway.
//!
//! Three builders consume the same descriptor list: OpenRPC (the default,
//! with `$ref`-deduplicated named schemas), a Postman collection, and a
//! JSight text document. The mock overlay store merges persisted mock
//! examples into the OpenRPC rendering on demand.

pub mod conversion;
pub mod jsight;
pub mod mocks;
pub mod openrpc;
pub mod postman;

pub use conversion::to_openrpc;
pub use jsight::to_jsight;
pub use mocks::{FileOverlayStorage, MockOverlayStore, MockStoreError, OverlayStorage};
pub use openrpc::OpenRpcDocument;
pub use postman::{PostmanCollection, to_postman};
