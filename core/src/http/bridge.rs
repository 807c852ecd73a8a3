/*
 * bridge.rs
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

//! Bridge between the decoded body byte stream and the JSON parser.
//!
//! The bridge owns the parser, its buffer and the value builder, and runs in one of
//! two modes chosen by the caller up front:
//! - `ParseMode::Stream`: each completed top-level value goes to the handler as soon as
//!   its last byte is parsed; the call returns no value.
//! - `ParseMode::Collect`: the body must hold exactly one value, which is returned.

use std::io;

use bytes::BytesMut;
use serde_json::Value;

use crate::json::{JsonError, JsonParser, ParserOptions, ValueBuilder};

/// How parsed values are delivered.
pub enum ParseMode<'a> {
    Collect,
    Stream(&'a mut (dyn FnMut(Value) + Send)),
}

impl ParseMode<'_> {
    pub fn is_streaming(&self) -> bool {
        matches!(self, ParseMode::Stream(_))
    }
}

impl std::fmt::Debug for ParseMode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Collect => f.write_str("Collect"),
            ParseMode::Stream(_) => f.write_str("Stream"),
        }
    }
}

pub struct ParserBridge<'a> {
    parser: JsonParser,
    builder: ValueBuilder,
    buf: BytesMut,
    mode: ParseMode<'a>,
    collected: Option<Value>,
}

impl<'a> ParserBridge<'a> {
    pub fn new(options: &ParserOptions, mode: ParseMode<'a>) -> Self {
        Self {
            parser: JsonParser::new(options.clone()),
            builder: ValueBuilder::new(),
            buf: BytesMut::with_capacity(8192),
            mode,
            collected: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.mode.is_streaming()
    }

    /// Feed the next decoded bytes, in order. Values completed by these bytes are
    /// delivered before this returns.
    pub fn feed(&mut self, data: &[u8]) -> Result<(), JsonError> {
        if data.is_empty() {
            return Ok(());
        }
        self.buf.extend_from_slice(data);
        self.parser.receive(&mut self.buf, &mut self.builder)?;
        self.deliver()
    }

    /// End of body: parse what is still buffered and return the collected value
    /// (collect mode) or None (streaming mode).
    pub fn finish(mut self) -> Result<Option<Value>, JsonError> {
        self.parser.close(&mut self.buf, &mut self.builder)?;
        self.deliver()?;
        match self.mode {
            ParseMode::Stream(_) => Ok(None),
            ParseMode::Collect => self
                .collected
                .map(Some)
                .ok_or_else(|| JsonError::new("no JSON value in response body")),
        }
    }

    fn deliver(&mut self) -> Result<(), JsonError> {
        for value in self.builder.take_completed() {
            match &mut self.mode {
                ParseMode::Stream(on_value) => on_value(value),
                ParseMode::Collect => {
                    if self.collected.is_some() {
                        return Err(JsonError::multiple_values());
                    }
                    self.collected = Some(value);
                }
            }
        }
        Ok(())
    }
}

/// Lets a decompressor write straight into the parser. Parser errors travel as
/// `InvalidData` I/O errors wrapping the `JsonError`.
impl io::Write for ParserBridge<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.feed(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
