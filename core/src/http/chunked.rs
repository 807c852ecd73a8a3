/*
 * chunked.rs
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

//! Chunked transfer-encoding decoder.
//!
//! `AwaitingSize -> AwaitingData -> AwaitingSize -> ... -> Done`. Framing is stripped and
//! every data byte is handed to the sink as soon as it is in the buffer, so a large chunk
//! reaches the JSON parser in as many pieces as the socket delivers it.

use std::io;

use bytes::{Buf, BytesMut};
use log::trace;

use crate::error::Result;
use crate::http::find_crlf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Next line is a chunk-size line (hex digits, optional `;extension`).
    AwaitingSize,
    /// `remaining` bytes of chunk data are still to come.
    AwaitingData,
    /// The zero-size chunk has been read.
    Done,
}

#[derive(Debug)]
pub struct ChunkDecoder {
    state: ChunkState,
    remaining: u64,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            state: ChunkState::AwaitingSize,
            remaining: 0,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.state == ChunkState::Done
    }

    /// Consume as much of `buf` as can be decoded. Data bytes go to `sink`; partial
    /// size lines stay in `buf` until more bytes arrive. Nothing after the terminator
    /// chunk is consumed (trailers are not read).
    pub fn decode<F>(&mut self, buf: &mut BytesMut, mut sink: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        loop {
            match self.state {
                ChunkState::AwaitingSize => {
                    let Some(line_end) = find_crlf(buf) else {
                        return Ok(());
                    };
                    let line = buf.split_to(line_end + 2);
                    // the CRLF closing the previous chunk's data reads as an empty line
                    if line_end == 0 {
                        continue;
                    }
                    let size = parse_chunk_size(&line[..line_end])?;
                    trace!("chunk of {} bytes", size);
                    if size == 0 {
                        self.state = ChunkState::Done;
                        return Ok(());
                    }
                    self.remaining = size;
                    self.state = ChunkState::AwaitingData;
                }
                ChunkState::AwaitingData => {
                    if buf.is_empty() {
                        return Ok(());
                    }
                    let take = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
                    let data = buf.split_to(take);
                    self.remaining -= take as u64;
                    if self.remaining == 0 {
                        self.state = ChunkState::AwaitingSize;
                    }
                    sink(&data)?;
                }
                ChunkState::Done => return Ok(()),
            }
        }
    }

    /// Called when the transport reaches end of stream. Ending while waiting for a size
    /// line counts as a complete body; ending inside chunk data does not.
    pub fn finish(&self) -> Result<()> {
        match self.state {
            ChunkState::AwaitingData => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed with {} bytes of chunk data outstanding", self.remaining),
            )
            .into()),
            ChunkState::AwaitingSize | ChunkState::Done => Ok(()),
        }
    }
}

/// Hex size before any `;extension`.
fn parse_chunk_size(line: &[u8]) -> Result<u64> {
    let invalid = || io::Error::new(io::ErrorKind::InvalidData, "invalid chunk size line");
    let line = std::str::from_utf8(line).map_err(|_| invalid())?;
    let hex = line.split(';').next().unwrap_or(line).trim();
    Ok(u64::from_str_radix(hex, 16).map_err(|_| invalid())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn decode_all(input: &[u8], piece: usize) -> (Vec<u8>, ChunkDecoder) {
        let mut decoder = ChunkDecoder::new();
        let mut buf = BytesMut::new();
        let mut out = Vec::new();
        for part in input.chunks(piece) {
            buf.extend_from_slice(part);
            decoder
                .decode(&mut buf, |data| {
                    out.extend_from_slice(data);
                    Ok(())
                })
                .unwrap();
        }
        (out, decoder)
    }

    #[test]
    fn single_chunk_then_terminator() {
        let (out, decoder) = decode_all(b"4\r\ntest\r\n0\r\n\r\n", 64);
        assert_eq!(out, b"test");
        assert!(decoder.is_done());
    }

    #[test]
    fn byte_at_a_time() {
        let (out, decoder) = decode_all(b"5\r\n{\"a\":\r\n3\r\n 1}\r\n0\r\n\r\n", 1);
        assert_eq!(out, b"{\"a\": 1}");
        assert!(decoder.is_done());
    }

    #[test]
    fn data_is_forwarded_before_chunk_completes() {
        let mut decoder = ChunkDecoder::new();
        let mut buf = BytesMut::from(&b"a\r\n01234"[..]);
        let mut out = Vec::new();
        decoder
            .decode(&mut buf, |d| {
                out.extend_from_slice(d);
                Ok(())
            })
            .unwrap();
        assert_eq!(out, b"01234");
        assert_eq!(decoder.state(), ChunkState::AwaitingData);
        assert_eq!(decoder.remaining(), 5);
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn extensions_are_ignored_and_hex_is_case_insensitive() {
        let (out, decoder) = decode_all(b"A;name=value\r\n0123456789\r\n0;last\r\n\r\n", 7);
        assert_eq!(out, b"0123456789");
        assert!(decoder.is_done());
    }

    #[test]
    fn bytes_after_terminator_are_left_alone() {
        let mut decoder = ChunkDecoder::new();
        let mut buf = BytesMut::from(&b"1\r\nx\r\n0\r\nTrailer: y\r\n\r\n"[..]);
        decoder.decode(&mut buf, |_| Ok(())).unwrap();
        assert!(decoder.is_done());
        assert_eq!(&buf[..], b"Trailer: y\r\n\r\n");
    }

    #[test]
    fn end_of_stream_between_chunks_is_clean() {
        let (out, decoder) = decode_all(b"2\r\nab\r\n", 3);
        assert_eq!(out, b"ab");
        assert_eq!(decoder.state(), ChunkState::AwaitingSize);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn garbage_size_line() {
        let mut decoder = ChunkDecoder::new();
        let mut buf = BytesMut::from(&b"zz\r\n"[..]);
        let err = decoder.decode(&mut buf, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::InvalidData));
    }

    #[test]
    fn sink_errors_stop_decoding() {
        let mut decoder = ChunkDecoder::new();
        let mut buf = BytesMut::from(&b"1\r\nx\r\n1\r\ny\r\n"[..]);
        let mut calls = 0;
        let result = decoder.decode(&mut buf, |_| {
            calls += 1;
            Err(Error::InvalidHead("stop".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
