// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Mutable mock-example overlay.
//!
//! The overlay is an OpenRPC-shaped document persisted behind a small
//! storage trait, parsed fresh on every operation. Mock examples are merged
//! into the rendered spec at build time and never written back into the
//! declared descriptors. Concurrent writers can lose updates; the store is
//! an admin tool, not a database.

use std::path::PathBuf;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::openrpc::{
    ContentDescriptor, ExamplePairing, JsonSchema, JsonSchemaInline, MethodObject, OpenRpcDocument,
};

/// The provenance marker prefixed to every overlay example name.
pub const MOCK_PREFIX: &str = "[MOCK]";

#[derive(Error, Debug)]
pub enum MockStoreError {
    #[error("Method {0} not found for removal")]
    MethodNotFound(String),

    #[error("Example not found for removal in method {0}")]
    ExampleNotFound(String),

    #[error("Overlay document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Overlay storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

/// Where the overlay document lives. `load` returns `None` when no overlay
/// has been persisted yet.
pub trait OverlayStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, MockStoreError>;
    fn save(&self, contents: &str) -> Result<(), MockStoreError>;
}

/// Overlay persisted as a single JSON file.
pub struct FileOverlayStorage {
    path: PathBuf,
}

impl FileOverlayStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OverlayStorage for FileOverlayStorage {
    fn load(&self) -> Result<Option<String>, MockStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), MockStoreError> {
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

pub struct MockOverlayStore {
    storage: Box<dyn OverlayStorage>,
}

impl MockOverlayStore {
    pub fn new(storage: Box<dyn OverlayStorage>) -> Self {
        Self { storage }
    }

    /// Append a mock example to a method, creating the method entry on first
    /// use. The example is named `[MOCK] <n>` with a discriminator unique
    /// within the method; the result schema is inferred from the value.
    pub fn add_mock(
        &self,
        method_name: &str,
        result: Value,
        params: &IndexMap<String, Value>,
    ) -> Result<(), MockStoreError> {
        let mut overlay = self.load_overlay()?;

        if overlay.get_method(method_name).is_none() {
            overlay.methods.push(MethodObject::new(
                method_name,
                ContentDescriptor::new("result", infer_schema(&result)),
            ));
        }
        // Just inserted above when absent
        let method = match overlay.get_method_mut(method_name) {
            Some(m) => m,
            None => return Err(MockStoreError::MethodNotFound(method_name.to_string())),
        };

        let discriminator = next_discriminator(&method.examples);
        let mut example = ExamplePairing::new(format!("{MOCK_PREFIX} {discriminator}"));
        for (name, value) in params {
            example = example.with_param(name, value.clone());
        }
        method.examples.push(example.with_result(result));

        self.save_overlay(&overlay)
    }

    /// Remove a whole method entry, or a single example identified by its
    /// parameter values. Example identity is the set of parameter values,
    /// not the example name; parameter-scoped removal keeps the method row
    /// even when its last example goes.
    pub fn remove_mock(
        &self,
        method_name: &str,
        params: Option<&IndexMap<String, Value>>,
    ) -> Result<(), MockStoreError> {
        let mut overlay = self.load_overlay()?;

        match params {
            None => {
                let before = overlay.methods.len();
                overlay.methods.retain(|m| m.name != method_name);
                if overlay.methods.len() == before {
                    return Err(MockStoreError::MethodNotFound(method_name.to_string()));
                }
            }
            Some(params) => {
                let Some(method) = overlay.get_method_mut(method_name) else {
                    return Err(MockStoreError::MethodNotFound(method_name.to_string()));
                };
                let Some(position) = method
                    .examples
                    .iter()
                    .position(|example| params_match(example, params))
                else {
                    return Err(MockStoreError::ExampleNotFound(method_name.to_string()));
                };
                method.examples.remove(position);
            }
        }

        self.save_overlay(&overlay)
    }

    /// Merge overlay examples into a rendered document. Overlay examples are
    /// appended after the declared ones; methods present only in the overlay
    /// surface only when `explicit_method` names them.
    pub fn build(
        &self,
        mut rendered: OpenRpcDocument,
        explicit_method: Option<&str>,
    ) -> Result<OpenRpcDocument, MockStoreError> {
        let overlay = self.load_overlay()?;

        for overlay_method in overlay.methods {
            if let Some(method) = rendered.get_method_mut(&overlay_method.name) {
                method.examples.extend(overlay_method.examples);
            } else if explicit_method == Some(overlay_method.name.as_str()) {
                rendered.methods.push(overlay_method);
            }
        }

        Ok(rendered)
    }

    fn load_overlay(&self) -> Result<OpenRpcDocument, MockStoreError> {
        match self.storage.load()? {
            Some(contents) => Ok(serde_json::from_str(&contents)?),
            None => Ok(OpenRpcDocument::new("Mock overlay", "0")),
        }
    }

    fn save_overlay(&self, overlay: &OpenRpcDocument) -> Result<(), MockStoreError> {
        let contents = serde_json::to_string_pretty(overlay)?;
        self.storage.save(&contents)
    }
}

fn next_discriminator(examples: &[ExamplePairing]) -> usize {
    examples
        .iter()
        .filter_map(|example| {
            example
                .name
                .strip_prefix(MOCK_PREFIX)
                .and_then(|rest| rest.trim().parse::<usize>().ok())
        })
        .max()
        .unwrap_or(0)
        + 1
}

/// Name-independent example identity: the multisets of parameter values must
/// be equal.
fn params_match(example: &ExamplePairing, params: &IndexMap<String, Value>) -> bool {
    if example.params.len() != params.len() {
        return false;
    }
    let mut expected: Vec<&Value> = params.values().collect();
    for actual in &example.params {
        match expected.iter().position(|v| **v == actual.value) {
            Some(i) => {
                expected.remove(i);
            }
            None => return false,
        }
    }
    true
}

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static URI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").unwrap());

/// Infer a JSON Schema from a concrete value. Strings are refined with a
/// format when they look like a date, date-time, email, or URI; arrays take
/// their item schema from the first element; object properties are inferred
/// recursively and all marked required.
pub fn infer_schema(value: &Value) -> JsonSchema {
    match value {
        Value::Null => JsonSchemaInline::null().into(),
        Value::Bool(_) => JsonSchemaInline::boolean().into(),
        Value::Number(n) if n.is_f64() => JsonSchemaInline::number().into(),
        Value::Number(_) => JsonSchemaInline::integer().into(),
        Value::String(s) => {
            let inline = JsonSchemaInline::string();
            if DATE_RE.is_match(s) {
                inline.with_format("date")
            } else if DATE_TIME_RE.is_match(s) {
                inline.with_format("date-time")
            } else if EMAIL_RE.is_match(s) {
                inline.with_format("email")
            } else if URI_RE.is_match(s) {
                inline.with_format("uri")
            } else {
                inline
            }
            .into()
        }
        Value::Array(elements) => match elements.first() {
            Some(first) => JsonSchemaInline::array(infer_schema(first)).into(),
            None => JsonSchemaInline::new("array").into(),
        },
        Value::Object(map) => {
            let mut inline = JsonSchemaInline::object();
            for (name, field_value) in map {
                inline = inline.with_property(name, infer_schema(field_value));
            }
            inline
                .with_required(map.keys().cloned().collect())
                .into()
        }
    }
}
