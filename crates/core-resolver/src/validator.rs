// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::TypeValidation;
use serde_json::Value;

use crate::violation::Violation;

/// Pluggable evaluation of per-parameter validation constraints. Every
/// failure becomes a violation; failures never stop type resolution for the
/// parameter.
pub trait ConstraintValidator: Send + Sync {
    fn validate(
        &self,
        path: &str,
        value: &Value,
        constraint: &TypeValidation,
        root: &str,
    ) -> Vec<Violation>;
}

/// Built-in range/length checks. Constraints on values of the wrong JSON
/// type are skipped here; the type mismatch itself is reported by the
/// resolver's type check.
pub struct DefaultValidator;

impl ConstraintValidator for DefaultValidator {
    fn validate(
        &self,
        path: &str,
        value: &Value,
        constraint: &TypeValidation,
        root: &str,
    ) -> Vec<Violation> {
        let mut violations = vec![];

        match constraint {
            TypeValidation::Int(constraints) => {
                if let Some(actual) = value.as_i64() {
                    if let Some(min) = constraints.min
                        && actual < min
                    {
                        violations.push(Violation::new(
                            path,
                            format!("This value should be {min} or more."),
                            root,
                        ));
                    }
                    if let Some(max) = constraints.max
                        && actual > max
                    {
                        violations.push(Violation::new(
                            path,
                            format!("This value should be {max} or less."),
                            root,
                        ));
                    }
                }
            }
            TypeValidation::Float(constraints) => {
                if let Some(actual) = value.as_f64() {
                    if let Some(min) = constraints.min
                        && actual < min
                    {
                        violations.push(Violation::new(
                            path,
                            format!("This value should be {min} or more."),
                            root,
                        ));
                    }
                    if let Some(max) = constraints.max
                        && actual > max
                    {
                        violations.push(Violation::new(
                            path,
                            format!("This value should be {max} or less."),
                            root,
                        ));
                    }
                }
            }
            TypeValidation::String(constraints) => {
                if let Some(actual) = value.as_str() {
                    let len = actual.chars().count();
                    if let Some(min_length) = constraints.min_length
                        && len < min_length
                    {
                        violations.push(Violation::new(
                            path,
                            format!(
                                "This value is too short. It should have {min_length} characters or more."
                            ),
                            root,
                        ));
                    }
                    if let Some(max_length) = constraints.max_length
                        && len > max_length
                    {
                        violations.push(Violation::new(
                            path,
                            format!(
                                "This value is too long. It should have {max_length} characters or less."
                            ),
                            root,
                        ));
                    }
                }
            }
        }

        violations
    }
}
