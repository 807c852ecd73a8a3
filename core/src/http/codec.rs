/*
 * codec.rs
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

//! Content codecs: which ones a client may advertise, and the stream readers that
//! decompress a non-chunked body straight into the JSON parser bridge.
//!
//! The decompressors are push-style (`Write`) so they can sit between socket reads
//! and the parser: compressed bytes go in, decompressed bytes come out into the bridge.

use std::convert::Infallible;
use std::fmt;
use std::io::{self, Write};
use std::marker::PhantomData;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::bridge::ParserBridge;
use crate::http::connection::Transport;
use crate::json::JsonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Bzip2,
    Gzip,
    /// Raw deflate stream (no zlib header).
    Deflate,
}

impl Codec {
    /// Advertisement order for Accept-Encoding.
    pub const ALL: [Codec; 3] = [Codec::Bzip2, Codec::Gzip, Codec::Deflate];

    pub fn token(self) -> &'static str {
        match self {
            Codec::Bzip2 => "bzip2",
            Codec::Gzip => "gzip",
            Codec::Deflate => "deflate",
        }
    }

    /// Codec named by a Content-Encoding value, if it is one we know.
    pub fn from_token(token: &str) -> Option<Codec> {
        let token = token.trim();
        Codec::ALL
            .into_iter()
            .find(|c| c.token().eq_ignore_ascii_case(token))
    }

    /// Whether this build carries a decoder for the codec (Cargo features `gzip`,
    /// `deflate`, `bzip2`).
    pub fn is_compiled(self) -> bool {
        match self {
            Codec::Bzip2 => cfg!(feature = "bzip2"),
            Codec::Gzip => cfg!(feature = "gzip"),
            Codec::Deflate => cfg!(feature = "deflate"),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Codec::Bzip2 => 1,
            Codec::Gzip => 2,
            Codec::Deflate => 4,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A set of codecs. Only codecs that are both in the set and compiled in are usable:
/// advertised in Accept-Encoding and honored in Content-Encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codecs {
    bits: u8,
}

impl Codecs {
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Every codec this build can decode.
    pub fn compiled() -> Self {
        Codec::ALL.into_iter().filter(|c| c.is_compiled()).collect()
    }

    pub fn with(self, codec: Codec) -> Self {
        Self {
            bits: self.bits | codec.bit(),
        }
    }

    pub fn without(self, codec: Codec) -> Self {
        Self {
            bits: self.bits & !codec.bit(),
        }
    }

    pub fn contains(&self, codec: Codec) -> bool {
        self.bits & codec.bit() != 0
    }

    /// In the set and compiled in.
    pub fn supports(&self, codec: Codec) -> bool {
        self.contains(codec) && codec.is_compiled()
    }

    /// Usable codecs in advertisement order.
    pub fn usable(&self) -> impl Iterator<Item = Codec> + '_ {
        Codec::ALL.into_iter().filter(|c| self.supports(*c))
    }

    /// Comma-joined Accept-Encoding value, or None when no codec is usable.
    pub fn accept_encoding(&self) -> Option<String> {
        let tokens: Vec<&str> = self.usable().map(Codec::token).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(","))
        }
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::compiled()
    }
}

impl FromIterator<Codec> for Codecs {
    fn from_iter<I: IntoIterator<Item = Codec>>(iter: I) -> Self {
        iter.into_iter().fold(Codecs::none(), Codecs::with)
    }
}

/// One decompressor writing into the bridge.
enum Decoder<'a> {
    #[cfg(feature = "gzip")]
    Gzip(flate2::write::GzDecoder<ParserBridge<'a>>),
    #[cfg(feature = "deflate")]
    Deflate(flate2::write::DeflateDecoder<ParserBridge<'a>>),
    #[cfg(feature = "bzip2")]
    Bzip2(bzip2::write::BzDecoder<ParserBridge<'a>>),
    /// Keeps `'a` used in builds without any codec feature; never constructed.
    #[allow(dead_code)]
    Unavailable(Infallible, PhantomData<ParserBridge<'a>>),
}

impl<'a> Decoder<'a> {
    /// Hands the bridge back when this build has no decoder for `codec`.
    #[allow(unreachable_patterns)]
    fn new(codec: Codec, bridge: ParserBridge<'a>) -> std::result::Result<Self, ParserBridge<'a>> {
        match codec {
            #[cfg(feature = "gzip")]
            Codec::Gzip => Ok(Decoder::Gzip(flate2::write::GzDecoder::new(bridge))),
            #[cfg(feature = "deflate")]
            Codec::Deflate => Ok(Decoder::Deflate(flate2::write::DeflateDecoder::new(bridge))),
            #[cfg(feature = "bzip2")]
            Codec::Bzip2 => Ok(Decoder::Bzip2(bzip2::write::BzDecoder::new(bridge))),
            _ => Err(bridge),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            #[cfg(feature = "gzip")]
            Decoder::Gzip(d) => d.write_all(data),
            #[cfg(feature = "deflate")]
            Decoder::Deflate(d) => d.write_all(data),
            #[cfg(feature = "bzip2")]
            Decoder::Bzip2(d) => d.write_all(data),
            Decoder::Unavailable(never, _) => match *never {},
        }
    }

    /// Flush the decompressor's tail and return the bridge.
    fn finish(self) -> io::Result<ParserBridge<'a>> {
        match self {
            #[cfg(feature = "gzip")]
            Decoder::Gzip(d) => d.finish(),
            #[cfg(feature = "deflate")]
            Decoder::Deflate(d) => d.finish(),
            #[cfg(feature = "bzip2")]
            Decoder::Bzip2(mut d) => d.finish(),
            Decoder::Unavailable(never, _) => match never {},
        }
    }
}

/// Drives decode-then-parse for a compressed, non-chunked body: reads the transport to
/// end of stream, decompresses, and feeds the parser.
pub struct StreamReader;

impl StreamReader {
    /// Parse the rest of the transport as a `codec`-encoded body. Returns the collected
    /// value in collect mode, None in streaming mode.
    pub async fn parse<S>(
        transport: &mut Transport<S>,
        codec: Codec,
        bridge: ParserBridge<'_>,
    ) -> Result<Option<Value>>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let mut decoder = match Decoder::new(codec, bridge) {
            Ok(decoder) => decoder,
            Err(bridge) => {
                warn!("no {} decoder in this build; parsing body as is", codec);
                return transport.pump(bridge).await;
            }
        };
        debug!("decoding {} body", codec);
        loop {
            let pending = transport.take_buffered();
            if !pending.is_empty() {
                decoder
                    .write_all(&pending)
                    .map_err(|e| classify(codec, e))?;
            }
            if !transport.fill().await? {
                break;
            }
        }
        let bridge = decoder.finish().map_err(|e| classify(codec, e))?;
        Ok(bridge.finish()?)
    }
}

/// Errors out of a decoder are either the parser's (wrapped by the bridge's `Write`
/// impl) or the codec's own.
fn classify(codec: Codec, e: io::Error) -> Error {
    if e.get_ref().is_some_and(|inner| inner.is::<JsonError>()) {
        if let Some(inner) = e.into_inner() {
            if let Ok(json) = inner.downcast::<JsonError>() {
                return Error::Json(*json);
            }
        }
        return Error::Json(JsonError::new("parser failed inside decoder"));
    }
    Error::Decode { codec, source: e }
}
