// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// Validation constraints that can be attached to a scalar parameter or
/// field. Evaluated by a pluggable constraint validator at resolution time
/// and rendered into the JSON Schema of the spec documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeValidation {
    Int(IntConstraints),
    Float(FloatConstraints),
    String(StringConstraints),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntConstraints {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntConstraints {
    pub fn from_range(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FloatConstraints {
    pub fn from_range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl StringConstraints {
    pub fn from_length_range(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length: Some(min_length),
            max_length: Some(max_length),
        }
    }
}
