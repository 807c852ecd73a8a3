/*
 * connection.rs
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

//! One request/response exchange over a connected stream: write the request, read the
//! head, pick the body pipeline and run it into the parser bridge.

use std::io;

use bytes::BytesMut;
use log::{debug, trace};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::http::bridge::{ParseMode, ParserBridge};
use crate::http::chunked::ChunkDecoder;
use crate::http::codec::{Codecs, StreamReader};
use crate::http::content::{check_content_type, BodyPipeline};
use crate::http::head::{HeadParser, ResponseHead};
use crate::http::request::Request;
use crate::json::ParserOptions;

const READ_CHUNK: usize = 8192;

/// A connected stream and its read buffer. Owned by exactly one call; dropping it
/// closes the stream.
pub struct Transport<S> {
    stream: S,
    read_buf: BytesMut,
    peer: String,
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    /// One read appended to the buffer. False at end of stream.
    pub async fn fill(&mut self) -> io::Result<bool> {
        self.read_buf.reserve(READ_CHUNK);
        let n = self.stream.read_buf(&mut self.read_buf).await?;
        Ok(n > 0)
    }

    pub fn buffer(&mut self) -> &mut BytesMut {
        &mut self.read_buf
    }

    /// Everything read but not yet consumed.
    pub fn take_buffered(&mut self) -> BytesMut {
        self.read_buf.split()
    }

    /// Feed the rest of the stream, unchanged, into the bridge.
    pub async fn pump(&mut self, mut bridge: ParserBridge<'_>) -> Result<Option<Value>> {
        loop {
            let pending = self.take_buffered();
            bridge.feed(&pending)?;
            if !self.fill().await? {
                break;
            }
        }
        Ok(bridge.finish()?)
    }

    /// Read until the blank line ending the head. Body bytes that came along stay buffered.
    pub async fn read_head(&mut self) -> Result<ResponseHead> {
        let mut parser = HeadParser::new();
        loop {
            if let Some(head) = parser.receive(&mut self.read_buf)? {
                return Ok(head);
            }
            if !self.fill().await? {
                return Err(Error::InvalidHead(
                    "connection closed before end of headers".to_string(),
                ));
            }
        }
    }
}

impl<S> Drop for Transport<S> {
    fn drop(&mut self) {
        trace!("closing connection to {}", self.peer);
    }
}

/// Send `request` and parse the response body in `mode`. Collect mode returns the
/// single value; streaming mode hands every value to the handler and returns None.
pub async fn exchange<S>(
    transport: &mut Transport<S>,
    request: &Request,
    codecs: &Codecs,
    parser: &ParserOptions,
    mode: ParseMode<'_>,
) -> Result<Option<Value>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!("{} {} ({})", request.method(), request.target(), transport.peer());
    transport.send(&request.to_bytes()).await?;

    let head = transport.read_head().await?;
    debug!("{} {} {}", head.version, head.code, head.message);

    let pipeline = BodyPipeline::select(&head, codecs);
    if pipeline == BodyPipeline::Chunked && !mode.is_streaming() {
        return Err(Error::ChunkedWithoutHandler);
    }
    // chunked streams are parsed whatever their Content-Type
    if pipeline != BodyPipeline::Chunked {
        check_content_type(&head)?;
    }
    debug!("body pipeline {:?}", pipeline);

    let bridge = ParserBridge::new(parser, mode);
    match pipeline {
        BodyPipeline::Chunked => read_chunked(transport, bridge).await,
        BodyPipeline::Direct => transport.pump(bridge).await,
        BodyPipeline::Decoded(codec) => StreamReader::parse(transport, codec, bridge).await,
    }
}

async fn read_chunked<S>(
    transport: &mut Transport<S>,
    mut bridge: ParserBridge<'_>,
) -> Result<Option<Value>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut decoder = ChunkDecoder::new();
    loop {
        decoder.decode(transport.buffer(), |data| Ok(bridge.feed(data)?))?;
        if decoder.is_done() {
            break;
        }
        if !transport.fill().await? {
            decoder.finish()?;
            break;
        }
    }
    Ok(bridge.finish()?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn head_split_across_reads() {
        let (client, mut server) = duplex(64);
        let mut transport = Transport::new(client, "test");
        tokio::spawn(async move {
            server.write_all(b"HTTP/1.1 200 OK\r\nContent-").await.unwrap();
            server.write_all(b"Type: application/json\r\n\r\n[1]").await.unwrap();
        });
        let head = transport.read_head().await.unwrap();
        assert_eq!(head.code, 200);
        let rest = transport.take_buffered();
        assert!(b"[1]".starts_with(&rest[..]));
    }

    #[tokio::test]
    async fn end_of_stream_inside_head() {
        let (client, mut server) = duplex(64);
        let mut transport = Transport::new(client, "test");
        server.write_all(b"HTTP/1.1 200 OK\r\n").await.unwrap();
        drop(server);
        assert!(matches!(transport.read_head().await, Err(Error::InvalidHead(_))));
    }

    #[tokio::test]
    async fn endless_header_line_is_cut_off() {
        let (client, mut server) = duplex(4096);
        let mut transport = Transport::new(client, "test");
        tokio::spawn(async move {
            let _ = server.write_all(b"HTTP/1.1 200 OK\r\nX-Never-Ends: ").await;
            let filler = [b'x'; 4096];
            while server.write_all(&filler).await.is_ok() {}
        });
        assert!(matches!(transport.read_head().await, Err(Error::InvalidHead(_))));
        assert!(transport.buffer().len() <= crate::http::MAX_HEAD_SIZE + READ_CHUNK);
    }

    #[tokio::test]
    async fn pump_parses_until_end_of_stream() {
        let (client, mut server) = duplex(16);
        let mut transport = Transport::new(client, "test");
        tokio::spawn(async move {
            server.write_all(b"{\"a\": [1, 2, 3], \"b\": \"long enough to span reads\"}").await.unwrap();
        });
        let bridge = ParserBridge::new(&ParserOptions::default(), ParseMode::Collect);
        let value = transport.pump(bridge).await.unwrap();
        assert_eq!(value, Some(json!({"a": [1, 2, 3], "b": "long enough to span reads"})));
    }

    #[tokio::test]
    async fn send_writes_everything() {
        let (client, mut server) = duplex(8);
        let mut transport = Transport::new(client, "test");
        let reader = tokio::spawn(async move {
            let mut out = Vec::new();
            server.read_to_end(&mut out).await.unwrap();
            out
        });
        transport.send(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        drop(transport);
        assert_eq!(reader.await.unwrap(), b"GET / HTTP/1.1\r\n\r\n");
    }
}
