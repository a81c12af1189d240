// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! JSight DSL rendering: a purely textual transform over the descriptor
//! list. No schema registry interaction beyond what the descriptors carry.

use core_model::{MethodDescriptor, RpcTypeSchema};

/// Render the descriptor list as a JSight document.
pub fn to_jsight(
    descriptors: &[MethodDescriptor],
    title: &str,
    version: &str,
    rpc_path: &str,
) -> String {
    let mut out = String::new();

    out.push_str("JSIGHT 0.3\n\n");
    out.push_str("INFO\n");
    out.push_str(&format!("  Title \"{title}\"\n"));
    out.push_str(&format!("  Version \"{version}\"\n\n"));
    out.push_str(&format!("URL {rpc_path}\n"));
    out.push_str("  Protocol json-rpc-2.0\n");

    for descriptor in descriptors {
        out.push('\n');
        out.push_str(&format!("  Method {}", descriptor.name));
        if descriptor.deprecated {
            out.push_str(" // deprecated");
        }
        out.push('\n');

        if let Some(summary) = &descriptor.summary {
            out.push_str("    Description\n");
            out.push_str(&format!("      {summary}\n"));
        }

        if !descriptor.params.is_empty() {
            out.push_str("    Params\n");
            out.push_str("      {\n");
            for param in &descriptor.params {
                let optional = if param.is_required() {
                    ""
                } else {
                    ", optional"
                };
                out.push_str(&format!(
                    "        \"{}\": {} // {{type: \"{}\"{optional}}}\n",
                    param.name,
                    placeholder(&param.schema),
                    jsight_type(&param.schema),
                ));
            }
            out.push_str("      }\n");
        }

        out.push_str("    Result\n");
        out.push_str(&format!(
            "      {} // {{type: \"{}\"}}\n",
            placeholder(&descriptor.result.schema),
            jsight_type(&descriptor.result.schema),
        ));
    }

    out
}

fn jsight_type(schema: &RpcTypeSchema) -> String {
    match schema.unwrap_optional() {
        RpcTypeSchema::Scalar { type_name, .. } => match type_name.as_str() {
            "Int" => "integer".to_string(),
            "Float" => "float".to_string(),
            "Boolean" => "boolean".to_string(),
            "DateTime" => "datetime".to_string(),
            "Json" => "any".to_string(),
            _ => "string".to_string(),
        },
        RpcTypeSchema::Enum { type_ref } => format!("@{type_ref}"),
        RpcTypeSchema::Object { type_ref } => format!("@{type_ref}"),
        RpcTypeSchema::Array { .. } => "array".to_string(),
        RpcTypeSchema::Union { .. } => "any".to_string(),
        RpcTypeSchema::Optional { .. } => unreachable!("unwrapped above"),
    }
}

fn placeholder(schema: &RpcTypeSchema) -> &'static str {
    match schema.unwrap_optional() {
        RpcTypeSchema::Scalar { type_name, .. } => match type_name.as_str() {
            "Int" => "1",
            "Float" => "1.0",
            "Boolean" => "true",
            _ => "\"...\"",
        },
        RpcTypeSchema::Array { .. } => "[]",
        _ => "{}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{ParamDescriptor, ResultDescriptor};

    #[test]
    fn renders_methods_and_params() {
        let descriptors = vec![
            MethodDescriptor::new(
                "hr.staff.findEmployee",
                ResultDescriptor::new(RpcTypeSchema::object("Employee")),
            )
            .with_summary("Look up an employee")
            .with_param(ParamDescriptor::new("name", RpcTypeSchema::scalar("String")))
            .with_param(ParamDescriptor::new(
                "limit",
                RpcTypeSchema::optional(RpcTypeSchema::scalar("Int")),
            )),
        ];

        let doc = to_jsight(&descriptors, "Operon", "1.0", "/rpc");

        assert!(doc.starts_with("JSIGHT 0.3"));
        assert!(doc.contains("URL /rpc"));
        assert!(doc.contains("Method hr.staff.findEmployee"));
        assert!(doc.contains("\"name\": \"...\" // {type: \"string\"}"));
        assert!(doc.contains("\"limit\": 1 // {type: \"integer\", optional}"));
        assert!(doc.contains("{} // {type: \"@Employee\"}"));
    }

    #[test]
    fn deprecated_methods_are_annotated() {
        let descriptors = vec![
            MethodDescriptor::new(
                "hr.staff.legacyPing",
                ResultDescriptor::new(RpcTypeSchema::scalar("Boolean")),
            )
            .deprecated(),
        ];

        let doc = to_jsight(&descriptors, "Operon", "1.0", "/rpc");
        assert!(doc.contains("Method hr.staff.legacyPing // deprecated"));
    }
}
