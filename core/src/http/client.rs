/*
 * client.rs
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

//! HTTP client entry points. Every call opens its own connection, sends one request,
//! parses the response body as JSON and closes the connection.
//!
//! Each verb comes in two forms:
//! - `get`, `post`, `put`, `delete` collect the body into a single value;
//! - `get_each`, `post_each`, `put_each`, `delete_each` hand every top-level value to
//!   `on_value` as soon as it is parsed. Chunked responses need this form.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{ClientConfig, RequestOptions};
use crate::error::{Error, Result};
use crate::http::bridge::ParseMode;
use crate::http::connection::{self, Transport};
use crate::http::request::{Method, Request};
use crate::json::JsonError;
use crate::net;
use crate::uri::Target;

/// Client holding the configuration shared by its calls. Calls share no other state.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(&self, uri: &str, options: &RequestOptions) -> Result<Value> {
        self.collect(Method::Get, uri, None, options).await
    }

    pub async fn post(&self, uri: &str, body: &[u8], options: &RequestOptions) -> Result<Value> {
        self.collect(Method::Post, uri, Some(body), options).await
    }

    pub async fn put(&self, uri: &str, body: &[u8], options: &RequestOptions) -> Result<Value> {
        self.collect(Method::Put, uri, Some(body), options).await
    }

    pub async fn delete(&self, uri: &str, options: &RequestOptions) -> Result<Value> {
        self.collect(Method::Delete, uri, None, options).await
    }

    pub async fn get_each<F>(&self, uri: &str, options: &RequestOptions, mut on_value: F) -> Result<()>
    where
        F: FnMut(Value) + Send,
    {
        self.request(Method::Get, uri, None, options, ParseMode::Stream(&mut on_value))
            .await
            .map(drop)
    }

    pub async fn post_each<F>(
        &self,
        uri: &str,
        body: &[u8],
        options: &RequestOptions,
        mut on_value: F,
    ) -> Result<()>
    where
        F: FnMut(Value) + Send,
    {
        self.request(Method::Post, uri, Some(body), options, ParseMode::Stream(&mut on_value))
            .await
            .map(drop)
    }

    pub async fn put_each<F>(
        &self,
        uri: &str,
        body: &[u8],
        options: &RequestOptions,
        mut on_value: F,
    ) -> Result<()>
    where
        F: FnMut(Value) + Send,
    {
        self.request(Method::Put, uri, Some(body), options, ParseMode::Stream(&mut on_value))
            .await
            .map(drop)
    }

    pub async fn delete_each<F>(&self, uri: &str, options: &RequestOptions, mut on_value: F) -> Result<()>
    where
        F: FnMut(Value) + Send,
    {
        self.request(Method::Delete, uri, None, options, ParseMode::Stream(&mut on_value))
            .await
            .map(drop)
    }

    /// General form: parse `uri`, connect, and run the exchange in `mode`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&[u8]>,
        options: &RequestOptions,
        mode: ParseMode<'_>,
    ) -> Result<Option<Value>> {
        let target: Target = uri.parse()?;
        let stream = net::connect(&target, &self.config).await?;
        self.exchange(stream, method, &target, body, options, mode).await
    }

    /// The same pipeline over a stream the caller has already connected to `target`.
    pub async fn exchange<S>(
        &self,
        stream: S,
        method: Method,
        target: &Target,
        body: Option<&[u8]>,
        options: &RequestOptions,
        mode: ParseMode<'_>,
    ) -> Result<Option<Value>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = Request::build(method, target, body, &self.config, options);
        let mut transport = Transport::new(stream, target.authority());
        connection::exchange(
            &mut transport,
            &request,
            &self.config.codecs,
            &options.parser,
            mode,
        )
        .await
    }

    async fn collect(
        &self,
        method: Method,
        uri: &str,
        body: Option<&[u8]>,
        options: &RequestOptions,
    ) -> Result<Value> {
        self.request(method, uri, body, options, ParseMode::Collect)
            .await?
            .ok_or_else(|| Error::Json(JsonError::new("no JSON value in response body")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::http::Codecs;

    async fn serve(response: &'static [u8]) -> (tokio::io::DuplexStream, tokio::task::JoinHandle<Vec<u8>>) {
        let (client, mut server) = duplex(4096);
        let handle = tokio::spawn(async move {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = server.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            server.write_all(response).await.unwrap();
            request
        });
        (client, handle)
    }

    fn target() -> Target {
        "http://example.com/items?page=2".parse().unwrap()
    }

    #[tokio::test]
    async fn collect_over_caller_stream() {
        let (stream, server) =
            serve(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"ok\": true}").await;
        let client = HttpClient::new(ClientConfig::default().with_codecs(Codecs::none()));
        let value = client
            .exchange(stream, Method::Get, &target(), None, &RequestOptions::default(), ParseMode::Collect)
            .await
            .unwrap();
        assert_eq!(value, Some(json!({"ok": true})));
        let request = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(request.starts_with("GET /items?page=2 HTTP/1.1\r\nHost: example.com\r\n"));
        assert!(!request.contains("Accept-Encoding"));
    }

    #[tokio::test]
    async fn chunked_needs_a_handler() {
        let (stream, _server) =
            serve(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: application/json\r\n\r\n2\r\n{}\r\n0\r\n\r\n")
                .await;
        let client = HttpClient::default();
        let err = client
            .exchange(stream, Method::Get, &target(), None, &RequestOptions::default(), ParseMode::Collect)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChunkedWithoutHandler));
    }

    #[tokio::test]
    async fn streaming_over_chunks() {
        let (stream, _server) = serve(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: application/json\r\n\r\n6\r\n{\"n\":1\r\n4\r\n}{\"n\r\n4\r\n\":2}\r\n0\r\n\r\n",
        )
        .await;
        let client = HttpClient::default();
        let mut seen = Vec::new();
        let mut on_value = |v: Value| seen.push(v);
        let result = client
            .exchange(
                stream,
                Method::Get,
                &target(),
                None,
                &RequestOptions::default(),
                ParseMode::Stream(&mut on_value),
            )
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(seen, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn html_is_rejected_with_its_type() {
        let (stream, _server) = serve(b"HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<html/>").await;
        let err = HttpClient::default()
            .exchange(stream, Method::Get, &target(), None, &RequestOptions::default(), ParseMode::Collect)
            .await
            .unwrap_err();
        assert!(err.is_invalid_content_type());
        assert_eq!(err.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn unsupported_scheme_fails_before_connecting() {
        let err = HttpClient::default()
            .get("ftp://example.com/", &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedUri(_)));
    }
}
