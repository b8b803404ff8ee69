//! Transfer settings recorded for whoever executes the request.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::values::{ConnectTo, ResolveEntry};

/// Redirect limit applied by `-L` when `--max-redirs` is not given.
pub const DEFAULT_MAX_REDIRS: u32 = 30;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    #[default]
    Auto,
    Http10,
    Http11,
    Http2,
}

impl HttpVersion {
    pub fn request_line(self) -> &'static str {
        match self {
            HttpVersion::Http10 => "HTTP/1.0",
            HttpVersion::Http2 => "HTTP/2",
            HttpVersion::Auto | HttpVersion::Http11 => "HTTP/1.1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueAt {
    /// `-C -`: resume from the size of the existing output file.
    Auto,
    Offset(u64),
}

/// Where the response body would be written. Nothing here touches disk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub file: Option<String>,
    pub remote_name: bool,
    pub output_dir: Option<String>,
    pub create_dirs: bool,
    pub continue_at: Option<ContinueAt>,
    pub remote_header_name: bool,
    pub remove_on_error: bool,
}

impl OutputPlan {
    /// The output path for `url`, or `None` for stdout.
    pub fn target_path(&self, url: &Url) -> Option<PathBuf> {
        let name = match (&self.file, self.remote_name) {
            (Some(file), _) => file.clone(),
            (None, true) => remote_file_name(url),
            (None, false) => return None,
        };
        Some(match &self.output_dir {
            Some(dir) => PathBuf::from(dir).join(name),
            None => PathBuf::from(name),
        })
    }
}

fn remote_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("index.html")
        .to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOutput {
    pub path: String,
    pub ascii: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,

    pub proxy: Option<String>,
    pub proxy_user: Option<String>,
    pub proxy_password: Option<String>,

    pub insecure: bool,
    pub ca_cert: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,

    pub follow_redirects: bool,
    pub max_redirs: Option<u32>,
    pub http_version: HttpVersion,
    pub compressed: bool,

    pub resolve: Vec<ResolveEntry>,
    pub connect_to: Vec<ConnectTo>,
    /// Bytes per second.
    pub limit_rate: Option<u64>,

    pub output: OutputPlan,
    pub write_out: Option<String>,
    pub fail_on_error: bool,

    pub verbose: bool,
    pub include: bool,
    pub silent: bool,
    pub trace: Option<TraceOutput>,
}

impl TransferConfig {
    /// The `--connect-to` override for `host:port`, first match wins.
    pub fn connect_target(&self, host: &str, port: u16) -> Option<&ConnectTo> {
        self.connect_to.iter().find(|entry| entry.matches(host, port))
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpVersion::Auto => f.write_str("auto"),
            version => f.write_str(version.request_line()),
        }
    }
}
