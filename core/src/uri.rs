/*
 * uri.rs
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

//! Request targets: the parts of an `http`/`https` URL that the request builder and the
//! transport need.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{Error, Result};

/// Scheme, authority, path, query and userinfo of a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: String,
    host: String,
    port: u16,
    path: String,
    query: Option<String>,
    userinfo: Option<String>,
}

impl Target {
    /// Accepts `http` and `https` URLs with a host. The fragment is dropped.
    pub fn from_url(url: &Url) -> Result<Self> {
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::UnsupportedUri(format!("scheme {} is not http or https", scheme)));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::UnsupportedUri(format!("{} has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::UnsupportedUri(format!("{} has no port", url)))?;
        let path = if url.path().is_empty() {
            "/".to_string()
        } else {
            url.path().to_string()
        };
        let userinfo = match (url.username(), url.password()) {
            ("", None) => None,
            (user, None) => Some(decode(user)),
            (user, Some(password)) => Some(format!("{}:{}", decode(user), decode(password))),
        };
        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            path,
            query: url.query().map(str::to_string),
            userinfo,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// `user` or `user:password`, percent-decoded.
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    fn default_port(&self) -> u16 {
        if self.is_secure() {
            443
        } else {
            80
        }
    }

    /// Path plus `?query` when a query is present.
    pub fn request_target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Value for the Host header: the port is included only when it is not the scheme default.
    pub fn host_header(&self) -> String {
        if self.port == self.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// `host:port` for connecting and for log records.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let url = Url::parse(s).map_err(|e| Error::UnsupportedUri(format!("{}: {}", s, e)))?;
        Self::from_url(&url)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host_header(), self.request_target())
    }
}
