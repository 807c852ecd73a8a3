/*
 * parser.rs
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

//! Push-model JSON parser: feed bytes via `receive()`, get events on a handler.
//!
//! # Buffer management contract
//!
//! The parser consumes only **complete** tokens from the buffer. Incomplete tokens
//! (e.g. a string whose closing `"` has not yet arrived, or a partial number) are
//! **left in the buffer**: the parser advances zero bytes and returns.
//!
//! The caller **must** keep unconsumed bytes at the front of the buffer and append
//! new data behind them before the next `receive()`. `BytesMut::extend_from_slice`
//! on the same buffer does exactly that.
//!
//! At end of input, `close()` parses whatever is still buffered with the knowledge
//! that no more bytes will arrive (so a trailing `42` is a complete number).
//!
//! Any number of top-level values may follow each other, separated by optional
//! whitespace. This is what long-lived API streams send.

use bytes::Buf;
use bytes::BytesMut;

use crate::json::error::JsonError;
use crate::json::handler::JsonContentHandler;
use crate::json::number::JsonNumber;

/// Options forwarded to the parser when a response body is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Accept `// line` and `/* block */` comments between tokens.
    pub allow_comments: bool,
    /// Reject strings that are not valid UTF-8. When false, bad sequences become U+FFFD.
    pub check_utf8: bool,
    /// Maximum nesting of objects and arrays.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_comments: false,
            check_utf8: true,
            max_depth: 1024,
        }
    }
}

impl ParserOptions {
    pub fn with_comments(mut self, allow: bool) -> Self {
        self.allow_comments = allow;
        self
    }

    pub fn with_utf8_check(mut self, check: bool) -> Self {
        self.check_utf8 = check;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Context for the parser (inside object vs array).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Object,
    Array,
}

/// Parser state: what we expect next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,      // any value
    Key,        // object key (string) or }
    Colon,      // :
    AfterValue, // comma or ] or }, or a new root value at depth 0
}

/// Push-model JSON parser. Push bytes with `receive()`; call `close()` at end of input.
pub struct JsonParser {
    options: ParserOptions,
    /// Skip UTF-8 BOM on first chunk.
    bom_checked: bool,
    closed: bool,
    context_stack: Vec<Context>,
    expect: Expect,
    after_comma: bool,
    seen_any_token: bool,
    /// Unescaped bytes of a string whose closing quote has not arrived. Its source
    /// bytes have already left the buffer.
    pending_string: Option<Vec<u8>>,
}

impl JsonParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            bom_checked: false,
            closed: false,
            context_stack: Vec::new(),
            expect: Expect::Value,
            after_comma: false,
            seen_any_token: false,
            pending_string: None,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// True once any token (not just whitespace or comments) has been parsed.
    pub fn has_seen_data(&self) -> bool {
        self.seen_any_token
    }

    /// Current nesting depth; zero between top-level values.
    pub fn depth(&self) -> usize {
        self.context_stack.len()
    }

    /// Push bytes into the parser. Events are delivered to the handler as complete
    /// tokens are recognized. Incomplete tokens are left in the buffer.
    pub fn receive<H: JsonContentHandler + ?Sized>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<(), JsonError> {
        if self.closed {
            return Err(JsonError::new("cannot receive after close"));
        }
        if !self.skip_bom(buf) {
            return Ok(());
        }
        while !buf.is_empty() {
            let consumed = match self.parse_one(buf, handler)? {
                Some(n) => n,
                None => return Ok(()),
            };
            buf.advance(consumed);
        }
        Ok(())
    }

    /// Signal end of input: parse what is left in `buf` as final, then validate that
    /// no structure is left open. Input with no tokens at all is accepted here; callers
    /// that need a value decide what an empty document means.
    pub fn close<H: JsonContentHandler + ?Sized>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<(), JsonError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.bom_checked = true;
        while !buf.is_empty() {
            match self.parse_one(buf, handler)? {
                Some(n) => buf.advance(n),
                None => return Err(JsonError::new("unexpected end of input")),
            }
        }
        if self.pending_string.is_some() {
            return Err(JsonError::new("unclosed string"));
        }
        if !self.context_stack.is_empty() {
            return Err(JsonError::new("unclosed structure"));
        }
        if self.expect != Expect::AfterValue && self.seen_any_token {
            return Err(JsonError::new("unexpected end of input"));
        }
        Ok(())
    }

    /// Returns false while a possible BOM prefix is still incomplete.
    fn skip_bom(&mut self, buf: &mut BytesMut) -> bool {
        if self.bom_checked {
            return true;
        }
        if buf.is_empty() {
            return false;
        }
        const BOM: &[u8] = &[0xef, 0xbb, 0xbf];
        if buf.len() >= 3 && buf[..3] == *BOM {
            buf.advance(3);
        } else if buf.len() < 3 && BOM.starts_with(&buf[..]) {
            return false;
        }
        self.bom_checked = true;
        true
    }

    fn push_context(&mut self, context: Context) -> Result<(), JsonError> {
        if self.context_stack.len() >= self.options.max_depth {
            return Err(JsonError::new(format!(
                "nesting exceeds maximum depth of {}",
                self.options.max_depth
            )));
        }
        self.context_stack.push(context);
        Ok(())
    }

    /// Bookkeeping after a complete scalar or a closed container.
    fn value_done(&mut self) {
        self.expect = Expect::AfterValue;
        self.after_comma = false;
        self.seen_any_token = true;
    }

    /// Scan string bytes from `data` (after the opening quote, or where the last scan
    /// stopped) into `raw`. Each byte is scanned once: an unfinished string keeps
    /// its bytes in `pending_string` and the scanned input is consumed.
    fn continue_string<H: JsonContentHandler + ?Sized>(
        &mut self,
        data: &[u8],
        mut raw: Vec<u8>,
        offset: usize,
        handler: &mut H,
    ) -> Result<Option<usize>, JsonError> {
        let (consumed, complete) = scan_string(data, &mut raw, self.closed)?;
        if !complete {
            self.pending_string = Some(raw);
            let consumed = offset + consumed;
            return Ok(if consumed == 0 { None } else { Some(consumed) });
        }
        let s = if self.options.check_utf8 {
            String::from_utf8(raw).map_err(|e| JsonError::with_source("invalid UTF-8 in string", e))?
        } else {
            String::from_utf8_lossy(&raw).into_owned()
        };
        if self.expect == Expect::Key {
            handler.key(&s);
            self.expect = Expect::Colon;
            self.after_comma = false;
            self.seen_any_token = true;
        } else {
            handler.string_value(&s);
            self.value_done();
        }
        Ok(Some(offset + consumed))
    }

    /// Parse one token from the front of `data`. Returns bytes consumed, or None if need more data.
    fn parse_one<H: JsonContentHandler + ?Sized>(
        &mut self,
        data: &[u8],
        handler: &mut H,
    ) -> Result<Option<usize>, JsonError> {
        if let Some(raw) = self.pending_string.take() {
            return self.continue_string(data, raw, 0, handler);
        }
        let b = data[0];
        if self.context_stack.is_empty()
            && self.expect == Expect::AfterValue
            && !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'/')
        {
            // next top-level value in a stream
            self.expect = Expect::Value;
        }
        match b {
            b'{' => {
                if self.expect != Expect::Value {
                    return Err(JsonError::new("unexpected '{'"));
                }
                self.push_context(Context::Object)?;
                handler.start_object();
                self.expect = Expect::Key;
                self.after_comma = false;
                self.seen_any_token = true;
                Ok(Some(1))
            }
            b'}' => {
                if self.context_stack.last() != Some(&Context::Object)
                    || (self.expect != Expect::Key && self.expect != Expect::AfterValue)
                {
                    return Err(JsonError::new("unexpected '}'"));
                }
                if self.after_comma {
                    return Err(JsonError::new("trailing comma before '}'"));
                }
                self.context_stack.pop();
                handler.end_object();
                self.value_done();
                Ok(Some(1))
            }
            b'[' => {
                if self.expect != Expect::Value {
                    return Err(JsonError::new("unexpected '['"));
                }
                self.push_context(Context::Array)?;
                handler.start_array();
                self.expect = Expect::Value;
                self.after_comma = false;
                self.seen_any_token = true;
                Ok(Some(1))
            }
            b']' => {
                if self.context_stack.last() != Some(&Context::Array)
                    || (self.expect != Expect::Value && self.expect != Expect::AfterValue)
                {
                    return Err(JsonError::new("unexpected ']'"));
                }
                if self.after_comma {
                    return Err(JsonError::new("trailing comma before ']'"));
                }
                self.context_stack.pop();
                handler.end_array();
                self.value_done();
                Ok(Some(1))
            }
            b',' => {
                if self.expect != Expect::AfterValue || self.context_stack.is_empty() {
                    return Err(JsonError::new("unexpected ','"));
                }
                self.after_comma = true;
                self.expect = if self.context_stack.last() == Some(&Context::Object) {
                    Expect::Key
                } else {
                    Expect::Value
                };
                Ok(Some(1))
            }
            b':' => {
                if self.expect != Expect::Colon {
                    return Err(JsonError::new("unexpected ':'"));
                }
                self.expect = Expect::Value;
                Ok(Some(1))
            }
            b' ' | b'\t' | b'\n' | b'\r' => Ok(Some(skip_whitespace(data))),
            b'/' => {
                if !self.options.allow_comments {
                    return Err(JsonError::new("comments are not allowed"));
                }
                skip_comment(data, self.closed)
            }
            b'"' => {
                if self.expect != Expect::Value && self.expect != Expect::Key {
                    return Err(JsonError::new("unexpected string"));
                }
                self.continue_string(&data[1..], Vec::new(), 1, handler)
            }
            b't' | b'f' | b'n' => {
                if self.expect != Expect::Value {
                    return Err(JsonError::new(format!("unexpected '{}'", b as char)));
                }
                let literal: &[u8] = match b {
                    b't' => b"true",
                    b'f' => b"false",
                    _ => b"null",
                };
                let Some(n) = parse_literal(data, literal, self.closed)? else {
                    return Ok(None);
                };
                match b {
                    b't' => handler.boolean_value(true),
                    b'f' => handler.boolean_value(false),
                    _ => handler.null_value(),
                }
                self.value_done();
                Ok(Some(n))
            }
            b'-' | b'0'..=b'9' => {
                if self.expect != Expect::Value {
                    return Err(JsonError::new("unexpected number"));
                }
                let Some((n, num)) = parse_number(data, self.closed)? else {
                    return Ok(None);
                };
                handler.number_value(num);
                self.value_done();
                Ok(Some(n))
            }
            _ => Err(JsonError::new(format!("unexpected character: {}", b as char))),
        }
    }
}

fn skip_whitespace(data: &[u8]) -> usize {
    data.iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
        .unwrap_or(data.len())
}

/// Skip a `//` or `/* */` comment starting at data[0].
fn skip_comment(data: &[u8], closed: bool) -> Result<Option<usize>, JsonError> {
    match data.get(1) {
        None if closed => Err(JsonError::new("unexpected '/'")),
        None => Ok(None),
        Some(b'/') => match data[2..].iter().position(|&b| b == b'\n') {
            Some(nl) => Ok(Some(2 + nl + 1)),
            None if closed => Ok(Some(data.len())),
            None => Ok(None),
        },
        Some(b'*') => match data[2..].windows(2).position(|w| w == b"*/") {
            Some(end) => Ok(Some(2 + end + 2)),
            None if closed => Err(JsonError::new("unclosed comment")),
            None => Ok(None),
        },
        Some(_) => Err(JsonError::new("unexpected '/'")),
    }
}

/// Scan string content (no opening quote) into `raw`. Returns the bytes consumed and
/// whether the closing quote was reached (and consumed). An escape split across
/// reads is left unconsumed.
fn scan_string(data: &[u8], raw: &mut Vec<u8>, closed: bool) -> Result<(usize, bool), JsonError> {
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'"' => return Ok((i + 1, true)),
            b'\\' => {
                let Some((adv, ch)) = parse_escape(&data[i + 1..], closed)? else {
                    return Ok((i, false));
                };
                let mut utf8 = [0u8; 4];
                raw.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                i += 1 + adv;
            }
            b if b < 0x20 => {
                return Err(JsonError::new("unescaped control character in string"));
            }
            _ => {
                let run = data[i..]
                    .iter()
                    .position(|&b| b == b'"' || b == b'\\' || b < 0x20)
                    .unwrap_or(data.len() - i);
                raw.extend_from_slice(&data[i..i + run]);
                i += run;
            }
        }
    }
    if closed {
        Err(JsonError::new("unclosed string"))
    } else {
        Ok((i, false))
    }
}

/// Parse escape sequence after `\`. Returns (bytes consumed, char), None = need more data.
fn parse_escape(data: &[u8], closed: bool) -> Result<Option<(usize, char)>, JsonError> {
    let Some(&c) = data.first() else {
        return if closed {
            Err(JsonError::new("unclosed string"))
        } else {
            Ok(None)
        };
    };
    let simple = match c {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{8}',
        b'f' => '\u{c}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return parse_unicode_escape(data, closed),
        _ => return Err(JsonError::new(format!("invalid escape: \\{}", c as char))),
    };
    Ok(Some((1, simple)))
}

/// `data` starts at the `u` of `\uXXXX`. Surrogate pairs must arrive as two escapes.
fn parse_unicode_escape(data: &[u8], closed: bool) -> Result<Option<(usize, char)>, JsonError> {
    let incomplete = || {
        if closed {
            Err(JsonError::new("incomplete \\u escape"))
        } else {
            Ok(None)
        }
    };
    if data.len() < 5 {
        return incomplete();
    }
    let high = hex4(&data[1..5])?;
    if !(0xd800..0xdc00).contains(&high) {
        return char::from_u32(high)
            .map(|ch| Some((5, ch)))
            .ok_or_else(|| JsonError::new("invalid Unicode code point"));
    }
    if data.len() < 11 {
        return incomplete();
    }
    if &data[5..7] != b"\\u" {
        return Err(JsonError::new("unpaired surrogate in \\u escape"));
    }
    let low = hex4(&data[7..11])?;
    if !(0xdc00..0xe000).contains(&low) {
        return Err(JsonError::new("unpaired surrogate in \\u escape"));
    }
    let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
    char::from_u32(code)
        .map(|ch| Some((11, ch)))
        .ok_or_else(|| JsonError::new("invalid Unicode code point"))
}

fn hex4(digits: &[u8]) -> Result<u32, JsonError> {
    let hex = std::str::from_utf8(digits).map_err(|_| JsonError::new("invalid \\u escape"))?;
    u32::from_str_radix(hex, 16).map_err(|e| JsonError::with_source("invalid \\u hex", e))
}

/// Match a literal (`true`, `false`, `null`). Returns Some(consumed) when complete.
fn parse_literal(data: &[u8], literal: &[u8], closed: bool) -> Result<Option<usize>, JsonError> {
    let available = data.len().min(literal.len());
    if data[..available] != literal[..available] {
        return Err(JsonError::new("invalid literal"));
    }
    if available < literal.len() {
        return if closed {
            Err(JsonError::new("incomplete literal"))
        } else {
            Ok(None)
        };
    }
    Ok(Some(literal.len()))
}

/// Parse number. Returns Some((consumed, JsonNumber)) when complete.
fn parse_number(data: &[u8], closed: bool) -> Result<Option<(usize, JsonNumber)>, JsonError> {
    let need_more = |closed: bool| {
        if closed {
            Err(JsonError::new("incomplete number"))
        } else {
            Ok(None)
        }
    };
    let digits_from = |mut i: usize| {
        while i < data.len() && data[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut i = 0;
    if data[i] == b'-' {
        i += 1;
        if i >= data.len() {
            return need_more(closed);
        }
    }
    if data[i] == b'0' {
        i += 1;
        if i < data.len() && data[i].is_ascii_digit() {
            return Err(JsonError::new("numbers cannot have leading zeros"));
        }
    } else if data[i].is_ascii_digit() {
        i = digits_from(i);
    } else {
        return Err(JsonError::new("invalid number"));
    }
    if i < data.len() && data[i] == b'.' {
        i += 1;
        if i >= data.len() {
            return need_more(closed);
        }
        if !data[i].is_ascii_digit() {
            return Err(JsonError::new("decimal point must be followed by digit"));
        }
        i = digits_from(i);
    }
    if i < data.len() && (data[i] == b'e' || data[i] == b'E') {
        i += 1;
        if i < data.len() && (data[i] == b'+' || data[i] == b'-') {
            i += 1;
        }
        if i >= data.len() {
            return need_more(closed);
        }
        if !data[i].is_ascii_digit() {
            return Err(JsonError::new("exponent must have digit"));
        }
        i = digits_from(i);
    }
    // A number touching the end of the buffer may still be growing.
    if i == data.len() && !closed {
        return Ok(None);
    }
    let s = std::str::from_utf8(&data[..i]).map_err(|_| JsonError::new("invalid UTF-8 in number"))?;
    let num = JsonNumber::from_literal(s).ok_or_else(|| JsonError::new(format!("invalid number: {}", s)))?;
    Ok(Some((i, num)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events as short strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl JsonContentHandler for Recorder {
        fn start_object(&mut self) {
            self.events.push("{".into());
        }
        fn end_object(&mut self) {
            self.events.push("}".into());
        }
        fn start_array(&mut self) {
            self.events.push("[".into());
        }
        fn end_array(&mut self) {
            self.events.push("]".into());
        }
        fn key(&mut self, key: &str) {
            self.events.push(format!("k:{}", key));
        }
        fn number_value(&mut self, number: JsonNumber) {
            self.events.push(format!("n:{}", number.as_f64()));
        }
        fn string_value(&mut self, value: &str) {
            self.events.push(format!("s:{}", value));
        }
        fn boolean_value(&mut self, value: bool) {
            self.events.push(format!("b:{}", value));
        }
        fn null_value(&mut self) {
            self.events.push("null".into());
        }
    }

    fn parse_in_pieces(input: &[u8], piece: usize, options: ParserOptions) -> Result<Vec<String>, JsonError> {
        let mut parser = JsonParser::new(options);
        let mut rec = Recorder::default();
        let mut buf = BytesMut::new();
        for part in input.chunks(piece) {
            buf.extend_from_slice(part);
            parser.receive(&mut buf, &mut rec)?;
        }
        parser.close(&mut buf, &mut rec)?;
        Ok(rec.events)
    }

    #[test]
    fn object_split_at_every_byte() {
        let input = br#"{"name":"caf\u00e9","n":[1,-2.5e1,true,null]}"#;
        let whole = parse_in_pieces(input, input.len(), ParserOptions::default()).unwrap();
        let bytewise = parse_in_pieces(input, 1, ParserOptions::default()).unwrap();
        assert_eq!(whole, bytewise);
        assert_eq!(
            whole,
            vec!["{", "k:name", "s:café", "k:n", "[", "n:1", "n:-25", "b:true", "null", "]", "}"]
        );
    }

    #[test]
    fn long_string_is_consumed_as_it_arrives() {
        let mut parser = JsonParser::new(ParserOptions::default());
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"[\""[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        let piece = vec![b'a'; 8192];
        for _ in 0..256 {
            buf.extend_from_slice(&piece);
            parser.receive(&mut buf, &mut rec).unwrap();
            assert!(buf.is_empty());
        }
        buf.extend_from_slice(b"\"]");
        parser.receive(&mut buf, &mut rec).unwrap();
        parser.close(&mut buf, &mut rec).unwrap();
        assert_eq!(rec.events.len(), 3);
        assert_eq!(rec.events[1].len(), 2 + 256 * 8192);
    }

    #[test]
    fn escape_split_across_reads_inside_pending_string() {
        let input = br#"{"k\u00e9y":"line\nnext\"quoted\""}"#;
        for piece in 1..input.len() {
            let events = parse_in_pieces(input, piece, ParserOptions::default()).unwrap();
            assert_eq!(events, vec!["{", "k:k\u{e9}y", "s:line\nnext\"quoted\"", "}"]);
        }
    }

    #[test]
    fn string_still_open_at_close() {
        let err = parse_in_pieces(b"[\"abc", 2, ParserOptions::default()).unwrap_err();
        assert!(err.message().contains("unclosed string"));
        assert!(parse_in_pieces(b"\"abc\\", 2, ParserOptions::default()).is_err());
    }

    #[test]
    fn consecutive_root_values() {
        let events = parse_in_pieces(b"{\"a\":1}\r\n[2] 3", 4, ParserOptions::default()).unwrap();
        assert_eq!(events, vec!["{", "k:a", "n:1", "}", "[", "n:2", "]", "n:3"]);
    }

    #[test]
    fn trailing_number_completes_on_close() {
        let mut parser = JsonParser::new(ParserOptions::default());
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"42"[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        assert!(rec.events.is_empty());
        parser.close(&mut buf, &mut rec).unwrap();
        assert_eq!(rec.events, vec!["n:42"]);
    }

    #[test]
    fn comma_between_root_values_is_rejected() {
        assert!(parse_in_pieces(b"1,2", 3, ParserOptions::default()).is_err());
    }

    #[test]
    fn unclosed_structure_fails_on_close() {
        let err = parse_in_pieces(b"[1,2", 2, ParserOptions::default()).unwrap_err();
        assert_eq!(err.message(), "unclosed structure");
    }

    #[test]
    fn comments_need_the_option() {
        let input = b"/* head */ {\"a\": // note\n 1}";
        assert!(parse_in_pieces(input, 5, ParserOptions::default()).is_err());
        let events = parse_in_pieces(input, 5, ParserOptions::default().with_comments(true)).unwrap();
        assert_eq!(events, vec!["{", "k:a", "n:1", "}"]);
    }

    #[test]
    fn depth_limit() {
        let options = ParserOptions::default().with_max_depth(2);
        assert!(parse_in_pieces(b"[[1]]", 8, options.clone()).is_ok());
        let err = parse_in_pieces(b"[[[1]]]", 8, options).unwrap_err();
        assert!(err.message().contains("maximum depth"));
    }

    #[test]
    fn surrogate_pair_across_chunks() {
        let events = parse_in_pieces(br#""\ud83d\ude00""#, 3, ParserOptions::default()).unwrap();
        assert_eq!(events, vec!["s:\u{1F600}"]);
    }

    #[test]
    fn utf8_check_can_be_relaxed() {
        let input = b"\"a\xffb\"";
        assert!(parse_in_pieces(input, 2, ParserOptions::default()).is_err());
        let events = parse_in_pieces(input, 2, ParserOptions::default().with_utf8_check(false)).unwrap();
        assert_eq!(events, vec!["s:a\u{FFFD}b"]);
    }

    #[test]
    fn bom_is_skipped() {
        let events = parse_in_pieces(b"\xef\xbb\xbf[]", 1, ParserOptions::default()).unwrap();
        assert_eq!(events, vec!["[", "]"]);
    }

    #[test]
    fn whitespace_only_input_closes_cleanly() {
        let mut parser = JsonParser::new(ParserOptions::default());
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b" \r\n "[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        parser.close(&mut buf, &mut rec).unwrap();
        assert!(!parser.has_seen_data());
    }

    #[test]
    fn bad_literal_detected_early() {
        let mut parser = JsonParser::new(ParserOptions::default());
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"tx"[..]);
        assert!(parser.receive(&mut buf, &mut rec).is_err());
    }
}
