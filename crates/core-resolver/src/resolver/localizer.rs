// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use crate::resolver::mapper;

/// Template-for-template substitution of structural mapper messages. The
/// table is keyed by the exact template string with `{placeholders}`
/// preserved; interpolation happens after the lookup, in the mapper error
/// itself. Unmapped templates pass through unchanged.
pub struct MessageLocalizer {
    table: HashMap<&'static str, &'static str>,
}

impl MessageLocalizer {
    /// The identity localizer (messages stay in English)
    pub fn passthrough() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Localizer for a locale code (`OPERON_LOCALE`). Unknown locales get
    /// the identity table.
    pub fn for_locale(locale: &str) -> Self {
        match locale {
            "ru" => Self { table: russian() },
            _ => Self::passthrough(),
        }
    }

    pub fn translate<'a>(&'a self, template: &'a str) -> &'a str {
        self.table.get(template).copied().unwrap_or(template)
    }
}

fn russian() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            mapper::TYPE_MISMATCH,
            "Значение типа {actual_type} не соответствует ожидаемому типу {expected_type}.",
        ),
        (
            mapper::MISSING_FIELD,
            "Не может быть пустым и должно содержать значение типа {expected_type}.",
        ),
        (
            mapper::INVALID_DATETIME,
            "Некорректное значение даты и времени {source_value}.",
        ),
        (
            mapper::UNKNOWN_ENUM_CASE,
            "Неизвестный вариант {source_value} для перечисления {expected_type}.",
        ),
        (
            mapper::UNDECLARED_TYPE,
            "Тип {expected_type} не объявлен.",
        ),
    ])
}
