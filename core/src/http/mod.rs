/*
 * mod.rs
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

//! HTTP/1.1 JSON client: one connection per call, push-parsed response head and body.
//!
//! - Request builder with `Connection: close` and the usable codecs in Accept-Encoding.
//! - Head parser over the shared `BytesMut` read buffer; header names lowercased.
//! - Body pipelines: chunked (framing stripped), direct, or decompressed by a codec
//!   stream reader. All three end in the JSON parser bridge.
//! - Content-Type allow-list checked before any byte of a non-chunked body is parsed.

mod bridge;
mod chunked;
mod codec;
mod content;
mod head;
mod request;

pub mod client;
pub mod connection;

pub use bridge::{ParseMode, ParserBridge};
pub use chunked::{ChunkDecoder, ChunkState};
pub use client::HttpClient;
pub use codec::{Codec, Codecs, StreamReader};
pub use connection::{exchange, Transport};
pub use content::{check_content_type, BodyPipeline, ALLOWED_MIME_TYPES};
pub use head::{HeadParser, ResponseHead, MAX_HEAD_SIZE};
pub use request::{Method, Request};

/// Offset of the first CRLF in `buf`.
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
