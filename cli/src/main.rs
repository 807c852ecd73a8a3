/*
 * main.rs
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

//! `ruscello`: send one request and print the JSON values in the response body.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::debug;
use ruscello_core::{
    ClientConfig, Codecs, Error, HttpClient, Method, ParseMode, ParserOptions, RequestOptions,
};
use serde_json::Value;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::Get,
            Verb::Post => Method::Post,
            Verb::Put => Method::Put,
            Verb::Delete => Method::Delete,
        }
    }
}

#[derive(Parser)]
#[command(name = "ruscello")]
#[command(about = "Stream JSON values from an HTTP endpoint", version)]
struct Cli {
    /// http:// or https:// URL
    url: String,

    #[arg(short = 'X', long, value_enum, default_value = "get")]
    method: Verb,

    /// Request body for POST and PUT
    #[arg(short, long)]
    data: Option<String>,

    /// Request Content-Type for POST and PUT
    #[arg(long)]
    content_type: Option<String>,

    #[arg(short = 'A', long)]
    user_agent: Option<String>,

    /// Extra request header, "Name: value"; repeatable
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Expect exactly one value and print it once the body is read
    #[arg(long)]
    collect: bool,

    #[arg(long)]
    pretty: bool,

    /// Accept // and /* */ comments in the body
    #[arg(long)]
    allow_comments: bool,

    /// Do not advertise or decode compressed bodies
    #[arg(long)]
    no_compression: bool,

    /// Seconds to wait for the TCP connect
    #[arg(long)]
    connect_timeout: Option<u64>,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {:?}", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn print_value(value: &Value, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("ruscello: cannot print value: {}", e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = ClientConfig::default();
    if cli.no_compression {
        config = config.with_codecs(Codecs::none());
    }
    if let Some(secs) = cli.connect_timeout {
        config = config.with_connect_timeout(Duration::from_secs(secs));
    }

    let mut options =
        RequestOptions::new().parser(ParserOptions::default().with_comments(cli.allow_comments));
    if let Some(agent) = cli.user_agent {
        options = options.user_agent(agent);
    }
    if let Some(content_type) = cli.content_type {
        options = options.content_type(content_type);
    }
    for (name, value) in cli.headers {
        options = options.header(name, value);
    }

    let method = Method::from(cli.method);
    let body = cli.data.as_deref().map(str::as_bytes);
    let body = if method.has_body() {
        Some(body.unwrap_or_default())
    } else {
        None
    };
    debug!("{} {}", method, cli.url);

    let client = HttpClient::new(config);
    let pretty = cli.pretty;
    let result = if cli.collect {
        client
            .request(method, &cli.url, body, &options, ParseMode::Collect)
            .await
            .map(|value| {
                if let Some(value) = value {
                    print_value(&value, pretty);
                }
            })
    } else {
        let mut on_value = |value: Value| print_value(&value, pretty);
        client
            .request(method, &cli.url, body, &options, ParseMode::Stream(&mut on_value))
            .await
            .map(drop)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ruscello: {}", e);
            exit_code(&e)
        }
    }
}

fn exit_code(e: &Error) -> ExitCode {
    if e.is_invalid_content_type() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
