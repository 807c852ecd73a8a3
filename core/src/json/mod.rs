/*
 * mod.rs
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

//! Push-model JSON: an incremental parser that reports tokens to a handler, and a
//! handler that assembles them into `serde_json::Value`s.

mod error;
mod handler;
mod number;
mod parser;
mod value;

pub use error::JsonError;
pub use handler::JsonContentHandler;
pub use number::JsonNumber;
pub use parser::{JsonParser, ParserOptions};
pub use value::ValueBuilder;
