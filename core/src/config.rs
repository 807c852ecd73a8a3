/*
 * config.rs
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

//! Client configuration and per-request options.
//!
//! Nothing here is global: the set of usable content codecs, the default user agent and
//! the connect timeout travel with the `ClientConfig` handed to each operation.

use std::time::Duration;

use crate::http::Codecs;
use crate::json::ParserOptions;

/// User-Agent sent when neither the config nor the request overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("Ruscello/", env!("CARGO_PKG_VERSION"));

/// Default request Content-Type for POST and PUT bodies.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Settings shared by every request a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Codecs advertised in Accept-Encoding and used to decode non-chunked bodies.
    pub codecs: Codecs,
    pub user_agent: String,
    /// `None` waits for the TCP connect indefinitely. Reads are never timed out.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            codecs: Codecs::compiled(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// Options for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides `ClientConfig::user_agent`.
    pub user_agent: Option<String>,
    /// Request body type for POST/PUT; defaults to `DEFAULT_CONTENT_TYPE`.
    pub content_type: Option<String>,
    /// Extra headers, sent in order after the standard ones. A name matching a standard
    /// header replaces its value; Content-Length is always computed from the body.
    pub headers: Vec<(String, String)>,
    /// Passed to the JSON parser that consumes the response body.
    pub parser: ParserOptions,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn parser(mut self, parser: ParserOptions) -> Self {
        self.parser = parser;
        self
    }
}
