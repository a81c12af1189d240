// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::RpcTypeSchema;
use crate::types::TypeValidation;

/// Describes one callable operation: its fully-qualified dotted name (e.g.
/// `events.rewards.getCountryList`), parameter and result shapes, declared
/// examples, documented error codes, and dispatch metadata.
///
/// Built once by a method provider and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Read-only operations are marked `[Q]` (query) in the Postman
    /// rendering; everything else is `[C]` (command).
    pub read_only: bool,
    /// When set, the whole raw parameter map is mapped as one object of the
    /// sole declared parameter's type (it is an error to set this with more
    /// than one parameter declared).
    pub auto_map_single_object: bool,
    pub tags: Vec<String>,
    /// Capability tag consumed by the external authorization collaborator
    pub capability: Option<String>,
    pub params: Vec<ParamDescriptor>,
    pub result: ResultDescriptor,
    /// Declared examples, keyed by example name
    pub examples: IndexMap<String, MethodExample>,
    pub errors: Vec<MethodErrorDoc>,
    /// Symbol scope of the declaring handler, used to resolve bare type
    /// references in parameter documentation
    pub symbol_context: SymbolContext,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, result: ResultDescriptor) -> Self {
        Self {
            name: name.into(),
            summary: None,
            description: None,
            deprecated: false,
            read_only: false,
            auto_map_single_object: false,
            tags: Vec::new(),
            capability: None,
            params: Vec::new(),
            result,
            examples: IndexMap::new(),
            errors: Vec::new(),
            symbol_context: SymbolContext::default(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn auto_map_single_object(mut self) -> Self {
        self.auto_map_single_object = true;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_example(mut self, name: impl Into<String>, example: MethodExample) -> Self {
        self.examples.insert(name.into(), example);
        self
    }

    pub fn with_error(mut self, code: i64, message: impl Into<String>) -> Self {
        self.errors.push(MethodErrorDoc {
            code,
            message: message.into(),
        });
        self
    }

    pub fn with_symbol_context(mut self, symbol_context: SymbolContext) -> Self {
        self.symbol_context = symbol_context;
        self
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// A declared parameter of a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    /// The parameter's type schema. An `Optional` schema makes the
    /// parameter nullable (and not required unless a default applies).
    pub schema: RpcTypeSchema,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Declared default, used when the caller omits the parameter
    pub default: Option<Value>,
    /// A variadic parameter short-circuits resolution: the whole raw
    /// parameter map is passed through unresolved
    pub variadic: bool,
    /// Validation constraints evaluated by the pluggable validator
    pub constraints: Vec<TypeValidation>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, schema: RpcTypeSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            description: None,
            deprecated: false,
            default: None,
            variadic: false,
            constraints: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn with_constraint(mut self, constraint: TypeValidation) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Returns true if this parameter is required (i.e., not optional and
    /// without a declared default)
    pub fn is_required(&self) -> bool {
        !self.schema.is_optional() && self.default.is_none()
    }
}

/// The declared result shape of a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDescriptor {
    pub schema: RpcTypeSchema,
    pub description: Option<String>,
}

impl ResultDescriptor {
    pub fn new(schema: RpcTypeSchema) -> Self {
        Self {
            schema,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A declared example: parameter values plus the expected result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodExample {
    pub params: IndexMap<String, Value>,
    pub result: Value,
}

impl MethodExample {
    pub fn new(params: IndexMap<String, Value>, result: Value) -> Self {
        Self { params, result }
    }
}

/// A documented error a method may return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodErrorDoc {
    pub code: i64,
    pub message: String,
}

/// The symbol scope of a handler declaration: its namespace and import
/// aliases. Bare type references in parameter documentation are resolved
/// against this scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolContext {
    pub namespace: String,
    /// alias -> fully qualified type name
    pub imports: IndexMap<String, String>,
}

impl SymbolContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            imports: IndexMap::new(),
        }
    }

    pub fn with_import(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.imports.insert(alias.into(), target.into());
        self
    }

    /// Resolve a type reference to a fully qualified name: dotted references
    /// are taken as-is, then import aliases, then the declaring namespace.
    pub fn qualify(&self, type_ref: &str) -> String {
        if type_ref.contains('.') {
            return type_ref.to_string();
        }
        if let Some(target) = self.imports.get(type_ref) {
            return target.clone();
        }
        if self.namespace.is_empty() {
            type_ref.to_string()
        } else {
            format!("{}.{}", self.namespace, type_ref)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_follows_schema_and_default() {
        let required = ParamDescriptor::new("id", RpcTypeSchema::scalar("Int"));
        assert!(required.is_required());

        let optional = ParamDescriptor::new(
            "filter",
            RpcTypeSchema::optional(RpcTypeSchema::scalar("String")),
        );
        assert!(!optional.is_required());

        let defaulted = ParamDescriptor::new("limit", RpcTypeSchema::scalar("Int"))
            .with_default(serde_json::json!(50));
        assert!(!defaulted.is_required());
    }

    #[test]
    fn symbol_context_qualification() {
        let ctx = SymbolContext::new("events.rewards")
            .with_import("Money", "finance.common.Money");

        assert_eq!(ctx.qualify("Country"), "events.rewards.Country");
        assert_eq!(ctx.qualify("Money"), "finance.common.Money");
        assert_eq!(ctx.qualify("hr.staff.Employee"), "hr.staff.Employee");
    }

    #[test]
    fn tag_intersection() {
        let descriptor = MethodDescriptor::new(
            "events.rewards.getCountryList",
            ResultDescriptor::new(RpcTypeSchema::array(RpcTypeSchema::object("Country"))),
        )
        .with_tag("rewards")
        .with_tag("public");

        assert!(descriptor.has_any_tag(&["public".to_string()]));
        assert!(!descriptor.has_any_tag(&["hr".to_string()]));
    }
}
