/*
 * request.rs
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

//! HTTP/1.1 request: method, target, headers, optional body.
//!
//! Built in one go from a `Target`, the client config and the request options; the
//! result is immutable and only lives for the duration of one call.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::{BufMut, BytesMut};
use log::warn;

use crate::config::{ClientConfig, RequestOptions, DEFAULT_CONTENT_TYPE};
use crate::uri::Target;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// POST and PUT carry a body (possibly empty) with Content-Length and Content-Type.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready to be written to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Assemble the request line and headers.
    ///
    /// Header order: Host, Authorization (when the URI has userinfo), User-Agent, Accept,
    /// Content-Length and Content-Type (POST/PUT only), Connection, Accept-Encoding (only
    /// when at least one codec is usable), Accept-Charset, then the caller's extra headers.
    /// An extra header named like a built-in one (case-insensitively) replaces its value
    /// in place; a caller Content-Length is dropped since it always follows the body.
    /// `body` is ignored for GET and DELETE and treated as empty when absent for POST/PUT.
    pub fn build(
        method: Method,
        target: &Target,
        body: Option<&[u8]>,
        config: &ClientConfig,
        options: &RequestOptions,
    ) -> Self {
        let mut headers = Vec::with_capacity(10 + options.headers.len());
        headers.push(("Host".to_string(), target.host_header()));
        if let Some(userinfo) = target.userinfo() {
            headers.push((
                "Authorization".to_string(),
                format!("Basic {}", BASE64.encode(userinfo.as_bytes())),
            ));
        }
        let user_agent = options.user_agent.as_deref().unwrap_or(&config.user_agent);
        headers.push(("User-Agent".to_string(), user_agent.to_string()));
        headers.push(("Accept".to_string(), "*/*".to_string()));

        let body = if method.has_body() {
            let body = body.unwrap_or_default().to_vec();
            let content_type = options.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
            headers.push(("Content-Length".to_string(), body.len().to_string()));
            headers.push(("Content-Type".to_string(), content_type.to_string()));
            Some(body)
        } else {
            None
        };

        // one request per connection, never reused
        headers.push(("Connection".to_string(), "close".to_string()));
        if let Some(encodings) = config.codecs.accept_encoding() {
            headers.push(("Accept-Encoding".to_string(), encodings));
        }
        headers.push(("Accept-Charset".to_string(), "utf-8".to_string()));
        let builtin = headers.len();
        for (name, value) in &options.headers {
            if name.eq_ignore_ascii_case("content-length") {
                warn!("ignoring Content-Length request header; it is derived from the body");
                continue;
            }
            match headers[..builtin]
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some(slot) => slot.1 = value.clone(),
                None => headers.push((name.clone(), value.clone())),
            }
        }

        Self {
            method,
            target: target.request_target(),
            headers,
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path and query as sent on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with this name (exact case, as supplied).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Request line, headers, blank line, body.
    pub fn to_bytes(&self) -> BytesMut {
        let body_len = self.body.as_ref().map_or(0, Vec::len);
        let mut out = BytesMut::with_capacity(256 + body_len);
        out.put_slice(format!("{} {} HTTP/1.1\r\n", self.method.as_str(), self.target).as_bytes());
        for (name, value) in &self.headers {
            out.put_slice(name.as_bytes());
            out.put_slice(b": ");
            out.put_slice(value.as_bytes());
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"\r\n");
        if let Some(body) = &self.body {
            out.put_slice(body);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Codec, Codecs};

    fn target(s: &str) -> Target {
        s.parse().unwrap()
    }

    fn text(request: &Request) -> String {
        String::from_utf8(request.to_bytes().to_vec()).unwrap()
    }

    #[test]
    fn request_line_per_method_and_query() {
        let config = ClientConfig::default();
        let opts = RequestOptions::default();
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            let with_query = Request::build(method, &target("http://h/p?x=1"), None, &config, &opts);
            assert!(text(&with_query).starts_with(&format!("{} /p?x=1 HTTP/1.1\r\n", method)));
            let without = Request::build(method, &target("http://h/p"), None, &config, &opts);
            assert!(text(&without).starts_with(&format!("{} /p HTTP/1.1\r\n", method)));
        }
    }

    #[test]
    fn post_body_headers() {
        let config = ClientConfig::default();
        let req = Request::build(
            Method::Post,
            &target("http://h/form"),
            Some(b"a=1&b=2".as_slice()),
            &config,
            &RequestOptions::default(),
        );
        assert_eq!(req.header("Content-Length"), Some("7"));
        assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
        assert!(text(&req).ends_with("\r\n\r\na=1&b=2"));

        let put = Request::build(
            Method::Put,
            &target("http://h/doc"),
            None,
            &config,
            &RequestOptions::new().content_type("application/json"),
        );
        assert_eq!(put.header("Content-Length"), Some("0"));
        assert_eq!(put.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn get_and_delete_send_no_body() {
        let config = ClientConfig::default();
        for method in [Method::Get, Method::Delete] {
            let req = Request::build(method, &target("http://h/"), Some(b"ignored".as_slice()), &config, &RequestOptions::default());
            assert_eq!(req.body(), None);
            assert_eq!(req.header("Content-Length"), None);
            assert_eq!(req.header("Content-Type"), None);
            assert!(text(&req).ends_with("\r\n\r\n"));
        }
    }

    #[test]
    fn basic_auth_from_userinfo() {
        let req = Request::build(
            Method::Get,
            &target("http://user:pass@h/"),
            None,
            &ClientConfig::default(),
            &RequestOptions::default(),
        );
        assert_eq!(req.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert!(text(&req).contains("Authorization: Basic dXNlcjpwYXNz\r\n"));
    }

    #[test]
    fn fixed_headers_and_user_agent() {
        let config = ClientConfig::default().with_user_agent("cfg-agent");
        let req = Request::build(Method::Get, &target("http://h/"), None, &config, &RequestOptions::default());
        assert_eq!(req.header("User-Agent"), Some("cfg-agent"));
        assert_eq!(req.header("Accept"), Some("*/*"));
        assert_eq!(req.header("Connection"), Some("close"));
        assert_eq!(req.header("Accept-Charset"), Some("utf-8"));
        assert_eq!(req.header("Authorization"), None);

        let req = Request::build(
            Method::Get,
            &target("http://h/"),
            None,
            &config,
            &RequestOptions::new().user_agent("override/1.0"),
        );
        assert_eq!(req.header("User-Agent"), Some("override/1.0"));
    }

    #[test]
    fn accept_encoding_lists_configured_codecs_only() {
        let opts = RequestOptions::default();
        let none = ClientConfig::default().with_codecs(Codecs::none());
        let req = Request::build(Method::Get, &target("http://h/"), None, &none, &opts);
        assert_eq!(req.header("Accept-Encoding"), None);
        assert!(!text(&req).contains("Accept-Encoding"));

        let gzip_only = ClientConfig::default().with_codecs(Codecs::none().with(Codec::Gzip));
        let req = Request::build(Method::Get, &target("http://h/"), None, &gzip_only, &opts);
        if cfg!(feature = "gzip") {
            assert_eq!(req.header("Accept-Encoding"), Some("gzip"));
        } else {
            assert_eq!(req.header("Accept-Encoding"), None);
        }
    }

    /// Split serialized bytes back into method, path, query, headers and body.
    fn parse_back(bytes: &[u8]) -> (String, String, Option<String>, Vec<(String, String)>, Vec<u8>) {
        let end = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = std::str::from_utf8(&bytes[..end]).unwrap();
        let mut lines = head.split("\r\n");
        let mut parts = lines.next().unwrap().split(' ');
        let method = parts.next().unwrap().to_string();
        let request_target = parts.next().unwrap();
        assert_eq!(parts.next(), Some("HTTP/1.1"));
        assert_eq!(parts.next(), None);
        let (path, query) = match request_target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (request_target.to_string(), None),
        };
        let headers = lines
            .map(|line| {
                let (name, value) = line.split_once(": ").unwrap();
                (name.to_string(), value.to_string())
            })
            .collect();
        (method, path, query, headers, bytes[end + 4..].to_vec())
    }

    #[test]
    fn serialized_request_parses_back_to_its_inputs() {
        let config = ClientConfig::default();
        let extras = [
            RequestOptions::default(),
            RequestOptions::new().header("X-Trace", "abc").header("X-Other", "1, 2"),
        ];
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            for uri in ["http://h:8080/a/b", "http://h:8080/a/b?x=1&y=two"] {
                for opts in &extras {
                    let t = target(uri);
                    let req = Request::build(method, &t, Some(b"k=v".as_slice()), &config, opts);
                    let (m, path, query, headers, body) = parse_back(&req.to_bytes());

                    assert_eq!(m, method.as_str());
                    assert_eq!(path, t.path());
                    assert_eq!(query.as_deref(), t.query());
                    assert_eq!(headers.as_slice(), req.headers());
                    assert!(headers.contains(&("Host".to_string(), "h:8080".to_string())));
                    for extra in &opts.headers {
                        assert!(headers.contains(extra));
                    }
                    let length = headers.iter().find(|(n, _)| n == "Content-Length");
                    if method.has_body() {
                        assert_eq!(body, b"k=v");
                        assert_eq!(length.map(|(_, v)| v.as_str()), Some("3"));
                    } else {
                        assert!(body.is_empty());
                        assert!(length.is_none());
                    }
                }
            }
        }
    }

    #[test]
    fn extra_headers_replace_builtin_ones() {
        let opts = RequestOptions::new()
            .header("host", "api.example")
            .header("Connection", "keep-alive")
            .header("Content-Length", "999")
            .header("X-New", "yes");
        let req = Request::build(
            Method::Post,
            &target("http://h/"),
            Some(b"abc".as_slice()),
            &ClientConfig::default(),
            &opts,
        );
        let count = |name: &str| req.headers().iter().filter(|(k, _)| k.eq_ignore_ascii_case(name)).count();
        assert_eq!(count("Host"), 1);
        assert_eq!(count("Connection"), 1);
        assert_eq!(count("Content-Length"), 1);
        assert_eq!(req.header("Host"), Some("api.example"));
        assert_eq!(req.header("Connection"), Some("keep-alive"));
        assert_eq!(req.header("Content-Length"), Some("3"));
        assert_eq!(req.headers()[0].0, "Host");
        assert_eq!(req.headers().last().map(|(k, _)| k.as_str()), Some("X-New"));
    }

    #[test]
    fn extra_headers_come_last() {
        let req = Request::build(
            Method::Get,
            &target("http://h/"),
            None,
            &ClientConfig::default(),
            &RequestOptions::new().header("X-Trace", "abc"),
        );
        let (name, value) = req.headers().last().unwrap();
        assert_eq!((name.as_str(), value.as_str()), ("X-Trace", "abc"));
    }
}
