/*
 * error.rs
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

//! Errors returned by the client operations.

use std::io;

use thiserror::Error;

use crate::http::Codec;
use crate::json::JsonError;

/// Everything a request can fail with. Transport and parser failures are passed
/// through unchanged; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The response is chunked but the call was made in collect mode, so there is
    /// nobody to hand the stream of values to.
    #[error("chunked response received, but no value handler was given to handle the chunks")]
    ChunkedWithoutHandler,

    /// The response MIME type is not one we can parse.
    #[error("the response MIME type {0:?} cannot be parsed as JSON")]
    InvalidContentType(String),

    #[error("unsupported URI: {0}")]
    UnsupportedUri(String),

    #[error("malformed response head: {0}")]
    InvalidHead(String),

    #[error("{codec} decoding failed: {source}")]
    Decode {
        codec: Codec,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] JsonError),
}

impl Error {
    /// True for the content-type classification failure, so callers can special-case it.
    pub fn is_invalid_content_type(&self) -> bool {
        matches!(self, Error::InvalidContentType(_))
    }

    /// The rejected MIME type, if this is a classification failure.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Error::InvalidContentType(mime) => Some(mime),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
