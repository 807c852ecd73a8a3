/*
 * head.rs
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

//! HTTP/1.1 response head: status line and headers, push-parsed line by line.

use std::collections::HashMap;

use bytes::{Buf, BytesMut};
use log::warn;

use crate::error::{Error, Result};
use crate::http::find_crlf;

/// Status line and headers of a response. Header names are stored lowercased;
/// values keep the received text, trimmed. A repeated header replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub version: String,
    pub code: u16,
    pub message: String,
    headers: HashMap<String, String>,
}

impl ResponseHead {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// `Transfer-Encoding` ends in `chunked`.
    pub fn is_chunked(&self) -> bool {
        self.header("transfer-encoding")
            .and_then(|v| v.rsplit(',').next())
            .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
    }

    /// The MIME type from `Content-Type`, without parameters such as `charset`.
    pub fn mime_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.header("content-encoding").map(str::trim)
    }
}

/// Largest response head accepted, status line and headers together.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Push parser for the response head. Feed the read buffer with `receive` until it
/// returns the head; body bytes that arrived with the head stay in the buffer.
#[derive(Debug)]
pub struct HeadParser {
    head: ResponseHead,
    seen_status: bool,
    /// Head bytes consumed so far.
    consumed: usize,
    limit: usize,
}

impl Default for HeadParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadParser {
    pub fn new() -> Self {
        Self::with_limit(MAX_HEAD_SIZE)
    }

    /// A parser that fails once the head grows past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            head: ResponseHead::default(),
            seen_status: false,
            consumed: 0,
            limit,
        }
    }

    /// Consume complete lines from `buf`. Returns the head once the blank line is seen;
    /// nothing past the blank line is consumed.
    pub fn receive(&mut self, buf: &mut BytesMut) -> Result<Option<ResponseHead>> {
        while let Some(line_end) = find_crlf(buf) {
            if line_end == 0 {
                buf.advance(2);
                return Ok(Some(std::mem::take(&mut self.head)));
            }
            self.consumed += line_end + 2;
            self.check_limit(0)?;
            let line = buf.split_to(line_end + 2);
            let line = std::str::from_utf8(&line[..line_end])
                .map_err(|_| Error::InvalidHead("response head is not valid UTF-8".to_string()))?;
            self.parse_line(line)?;
        }
        // what is left is an unterminated line
        self.check_limit(buf.len())?;
        Ok(None)
    }

    fn check_limit(&self, pending: usize) -> Result<()> {
        if self.consumed + pending > self.limit {
            return Err(Error::InvalidHead(format!(
                "response head exceeds {} bytes",
                self.limit
            )));
        }
        Ok(())
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some((name, value)) = line.split_once(": ") {
            self.store_header(name, value);
        } else if line.starts_with("HTTP/") || !line.contains(':') {
            self.parse_status(line)?;
        } else if let Some((name, value)) = line.split_once(':') {
            // "Name:value" without the space
            self.store_header(name, value);
        }
        Ok(())
    }

    fn store_header(&mut self, name: &str, value: &str) {
        self.head
            .headers
            .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// `HTTP/1.1 200 OK`: version, numeric code, rest of the line as message.
    fn parse_status(&mut self, line: &str) -> Result<()> {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let version = parts.next().unwrap_or_default();
        let code = parts
            .next()
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| Error::InvalidHead(format!("bad status line: {}", line)))?;
        if self.seen_status {
            warn!("second status line in response head: {}", line);
        }
        self.seen_status = true;
        self.head.version = version.to_string();
        self.head.code = code;
        self.head.message = parts.next().unwrap_or_default().trim().to_string();
        Ok(())
    }
}
