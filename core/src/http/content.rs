/*
 * content.rs
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

//! Response body checks: the Content-Type allow-list and the choice of body pipeline.

use log::warn;

use crate::error::{Error, Result};
use crate::http::codec::{Codec, Codecs};
use crate::http::head::ResponseHead;

/// MIME types accepted as a JSON body. Matched case-insensitively, parameters ignored.
pub const ALLOWED_MIME_TYPES: [&str; 2] = ["application/json", "text/plain"];

/// Reject bodies whose MIME type is missing or not on the allow-list. The error
/// carries the received MIME type (empty when there was no Content-Type).
pub fn check_content_type(head: &ResponseHead) -> Result<()> {
    let mime = head.mime_type().unwrap_or_default();
    if ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    {
        Ok(())
    } else {
        Err(Error::InvalidContentType(mime.to_string()))
    }
}

/// How the body bytes travel from the transport to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPipeline {
    /// Chunk framing stripped, data fed directly. Content-Encoding is not applied.
    Chunked,
    /// Raw bytes until end of stream.
    Direct,
    /// Raw bytes until end of stream, decompressed on the way.
    Decoded(Codec),
}

impl BodyPipeline {
    pub fn select(head: &ResponseHead, codecs: &Codecs) -> Self {
        if head.is_chunked() {
            if let Some(encoding) = head.content_encoding() {
                warn!("ignoring Content-Encoding {:?} on chunked response", encoding);
            }
            return BodyPipeline::Chunked;
        }
        let Some(encoding) = head.content_encoding().filter(|e| !e.is_empty()) else {
            return BodyPipeline::Direct;
        };
        match Codec::from_token(encoding) {
            Some(codec) if codecs.supports(codec) => BodyPipeline::Decoded(codec),
            Some(codec) => {
                warn!("Content-Encoding {} not enabled; parsing body as is", codec);
                BodyPipeline::Direct
            }
            None => {
                if !encoding.eq_ignore_ascii_case("identity") {
                    warn!("unknown Content-Encoding {:?}; parsing body as is", encoding);
                }
                BodyPipeline::Direct
            }
        }
    }
}
