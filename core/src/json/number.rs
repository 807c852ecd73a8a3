/*
 * number.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Ruscello, a streaming JSON-over-HTTP client.
 *
 * Ruscello is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Ruscello is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Ruscello.  If not, see <http://www.gnu.org/licenses/>.
 */

//! JSON number value as reported by the parser.

use serde_json::{Number, Value};

/// A JSON number. Integers that do not fit `i64` are kept as `u64` when
/// non-negative, otherwise they degrade to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl JsonNumber {
    /// Interpret the literal text of a number token.
    pub(crate) fn from_literal(s: &str) -> Option<Self> {
        if s.contains(['.', 'e', 'E']) {
            return s.parse::<f64>().ok().map(JsonNumber::F64);
        }
        if let Ok(n) = s.parse::<i64>() {
            return Some(JsonNumber::I64(n));
        }
        if let Ok(n) = s.parse::<u64>() {
            return Some(JsonNumber::U64(n));
        }
        s.parse::<f64>().ok().map(JsonNumber::F64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsonNumber::I64(n) => Some(*n),
            JsonNumber::U64(n) => i64::try_from(*n).ok(),
            JsonNumber::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            JsonNumber::I64(n) => *n as f64,
            JsonNumber::U64(n) => *n as f64,
            JsonNumber::F64(f) => *f,
        }
    }
}

impl From<JsonNumber> for Value {
    /// Non-finite floats (e.g. `1e999`) have no JSON representation and become `null`.
    fn from(number: JsonNumber) -> Self {
        match number {
            JsonNumber::I64(n) => Value::from(n),
            JsonNumber::U64(n) => Value::from(n),
            JsonNumber::F64(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}
