//! Cookie strings, Netscape cookie files and the per-host store.

use std::collections::HashMap;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl CookieEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }
}

/// Parse `a=1; b=2` into entries in source order. Duplicates are kept.
pub fn parse_cookie_string(input: &str) -> Vec<CookieEntry> {
    input
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CookieEntry::new(name, unquote(value.trim())))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// True when the text looks like a Netscape cookie-jar file.
pub fn is_netscape_format(input: &str) -> bool {
    input.starts_with("# Netscape HTTP Cookie File")
        || input.starts_with("# HTTP Cookie File")
        || input
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .any(|line| line.split('\t').count() == 7)
}

/// Parse Netscape cookie-jar lines:
/// `domain  include_subdomains  path  secure  expires  name  value`.
pub fn parse_netscape(input: &str) -> Vec<CookieEntry> {
    input
        .lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            let line = match line.strip_prefix("#HttpOnly_") {
                Some(rest) => rest,
                None if line.starts_with('#') => return None,
                None => line,
            };
            let fields: Vec<&str> = line.split('\t').collect();
            let [domain, _, path, _, _, name, value] = fields.as_slice() else {
                return None;
            };
            Some(CookieEntry {
                name: (*name).to_owned(),
                value: (*value).to_owned(),
                domain: Some((*domain).to_owned()),
                path: Some((*path).to_owned()),
            })
        })
        .collect()
}

/// Either a Netscape file or a plain cookie string.
pub fn parse_cookie_file(input: &str) -> Vec<CookieEntry> {
    if is_netscape_format(input) {
        parse_netscape(input)
    } else {
        parse_cookie_string(input.trim())
    }
}

/// Cookies keyed by request host.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CookieJar {
    hosts: HashMap<String, Vec<CookieEntry>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entries` for the host of `url`, filling in a missing domain with
    /// the host and a missing path with the URL's default cookie path.
    pub fn merge(&mut self, url: &Url, entries: &[CookieEntry]) {
        let Some(host) = url.host_str() else {
            return;
        };
        let path = default_path(url);
        let stored = self.hosts.entry(host.to_owned()).or_default();
        stored.extend(entries.iter().map(|entry| CookieEntry {
            domain: entry.domain.clone().or_else(|| Some(host.to_owned())),
            path: entry.path.clone().or_else(|| Some(path.clone())),
            ..entry.clone()
        }));
    }

    pub fn cookies(&self, host: &str) -> &[CookieEntry] {
        self.hosts.get(host).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.values().all(Vec::is_empty)
    }
}

/// Directory of the URL path, `/` at minimum.
pub fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_owned(),
        Some(end) => path[..end].to_owned(),
    }
}
