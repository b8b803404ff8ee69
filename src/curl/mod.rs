pub mod config;
pub mod dialect;
mod handlers;
pub mod header;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod state;
pub mod values;

use std::fmt;
use std::fmt::Write as _;

use url::Url;

use crate::auth::Authentication;
use crate::body::{Body, Payload};
use crate::cookie::{CookieEntry, CookieJar};
pub use config::{ContinueAt, HttpVersion, OutputPlan, TransferConfig};
pub use handlers::Handler;
pub use header::HeaderMap;

/// A parsed curl command, ready to hand to an HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct Curl {
    pub url: Url,
    pub method: String,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    /// Cookies in command order, duplicates included.
    pub cookies: Vec<CookieEntry>,
    pub cookie_jar: CookieJar,
    pub auth: Option<Authentication>,
    pub content_type: Option<String>,
    pub get_mode: bool,
    /// Data moved into the query string by `-G`.
    pub query_data: Option<String>,
    pub config: TransferConfig,
}

impl Curl {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Content type of the body, or of the request headers without one.
    pub fn effective_content_type(&self) -> Option<String> {
        match &self.body {
            Some(body) => Some(body.content_type().into_owned()),
            None => self.content_type.clone(),
        }
    }

    /// A `curl -v` style preview of what would go on the wire.
    pub fn verbose_info(&self) -> String {
        let mut out = String::new();
        let host = self.url.host_str().unwrap_or_default();
        let port = self.url.port_or_known_default().unwrap_or_default();

        for entry in &self.config.resolve {
            let _ = writeln!(out, "* Added {entry} to DNS cache");
        }
        if let Some(target) = self.config.connect_target(host, port) {
            let _ = writeln!(out, "* Connecting to {host}:{port} via {target}");
        }
        if let Some(proxy) = &self.config.proxy {
            let _ = writeln!(out, "* Using proxy {proxy}");
        }

        let target = match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_owned(),
        };
        let _ = writeln!(
            out,
            "> {} {target} {}",
            self.method,
            self.config.http_version.request_line()
        );
        match self.url.port() {
            Some(port) => {
                let _ = writeln!(out, "> Host: {host}:{port}");
            }
            None => {
                let _ = writeln!(out, "> Host: {host}");
            }
        }
        if let Some(auth) = &self.auth {
            if !self.headers.contains("Authorization") {
                let _ = writeln!(out, "> Authorization: {auth}");
            }
        }
        for (name, value) in self.headers.iter() {
            let _ = writeln!(out, "> {name}: {value}");
        }
        if let Some(length) = self.body.as_ref().and_then(|body| body.length().ok()) {
            if !self.headers.contains("Content-Length") {
                let _ = writeln!(out, "> Content-Length: {length}");
            }
        }
        out.push_str(">\n");
        out
    }
}

/// `METHOD URL | N headers | N cookies | body(kind, N bytes) | auth | proxy | insecure`
impl fmt::Display for Curl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {} headers | {} cookies",
            self.method,
            self.url,
            self.headers.len(),
            self.cookies.len()
        )?;
        if let Some(body) = &self.body {
            match body.length() {
                Ok(length) => write!(f, " | body({}, {length} bytes)", body.kind())?,
                Err(_) => write!(f, " | body({})", body.kind())?,
            }
        }
        if let Some(auth) = &self.auth {
            write!(f, " | auth: {}", auth.kind)?;
        }
        if let Some(proxy) = &self.config.proxy {
            write!(f, " | proxy: {proxy}")?;
        }
        if self.config.insecure {
            f.write_str(" | insecure")?;
        }
        Ok(())
    }
}
