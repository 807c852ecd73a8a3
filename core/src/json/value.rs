/*
 * value.rs
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

//! Assembles parser events into `serde_json::Value` trees, one per top-level value.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::json::handler::JsonContentHandler;
use crate::json::number::JsonNumber;

enum Frame {
    Object {
        map: Map<String, Value>,
        key: Option<String>,
    },
    Array(Vec<Value>),
}

/// Handler that builds values and queues each completed top-level value.
/// Drain the queue with `take_completed` after every `receive`.
#[derive(Default)]
pub struct ValueBuilder {
    stack: Vec<Frame>,
    completed: VecDeque<Value>,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a top-level value is partially built.
    pub fn in_progress(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Remove and return the values completed so far, oldest first.
    pub fn take_completed(&mut self) -> std::collections::vec_deque::Drain<'_, Value> {
        self.completed.drain(..)
    }

    fn push_value(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => self.completed.push_back(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { map, key }) => {
                // later duplicates win, as in serde_json
                if let Some(k) = key.take() {
                    map.insert(k, value);
                }
            }
        }
    }
}

impl JsonContentHandler for ValueBuilder {
    fn start_object(&mut self) {
        self.stack.push(Frame::Object {
            map: Map::new(),
            key: None,
        });
    }

    fn end_object(&mut self) {
        if let Some(Frame::Object { map, .. }) = self.stack.pop() {
            self.push_value(Value::Object(map));
        }
    }

    fn start_array(&mut self) {
        self.stack.push(Frame::Array(Vec::new()));
    }

    fn end_array(&mut self) {
        if let Some(Frame::Array(items)) = self.stack.pop() {
            self.push_value(Value::Array(items));
        }
    }

    fn key(&mut self, key: &str) {
        if let Some(Frame::Object { key: slot, .. }) = self.stack.last_mut() {
            *slot = Some(key.to_string());
        }
    }

    fn number_value(&mut self, number: JsonNumber) {
        self.push_value(number.into());
    }

    fn string_value(&mut self, value: &str) {
        self.push_value(Value::String(value.to_string()));
    }

    fn boolean_value(&mut self, value: bool) {
        self.push_value(Value::Bool(value));
    }

    fn null_value(&mut self) {
        self.push_value(Value::Null);
    }
}
