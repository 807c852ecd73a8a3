/*
 * lib.rs
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

//! Ruscello: a streaming JSON-over-HTTP/1.1 client.
//!
//! A call sends one request on a fresh connection and parses the response body as it
//! arrives. In streaming mode every top-level JSON value is handed to the caller as
//! soon as it is complete; in collect mode the single value is returned.

pub mod config;
pub mod error;
pub mod http;
pub mod json;
pub mod net;
pub mod uri;

pub use config::{ClientConfig, RequestOptions};
pub use error::{Error, Result};
pub use http::{Codec, Codecs, HttpClient, Method, ParseMode};
pub use json::{JsonError, ParserOptions};
pub use uri::Target;
