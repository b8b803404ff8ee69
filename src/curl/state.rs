use url::Url;

use super::Curl;
use super::config::TransferConfig;
use super::header::HeaderMap;
use crate::auth::Authentication;
use crate::body::{Body, FORM_URLENCODED, JsonBody, MULTIPART_FORM_DATA, Payload};
use crate::cookie::{CookieEntry, CookieJar};
use crate::error::{Error, Result};
use crate::log::debug;

pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const COOKIE: &str = "Cookie";
pub(crate) const ACCEPT: &str = "Accept";

/// Where the current content type came from. An explicit header always
/// beats one inferred from a data or form flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeOrigin {
    Explicit,
    Inferred,
}

/// The builder's working object, mutated by option handlers in token order.
#[derive(Debug, Default, Clone)]
pub struct RequestState {
    pub url: Option<Url>,
    pub method: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    pub cookies: Vec<CookieEntry>,
    pub auth: Option<Authentication>,
    pub content_type: Option<String>,
    pub content_type_origin: Option<ContentTypeOrigin>,
    pub get_mode: bool,
    /// `--json` was used; the accumulated text becomes a JSON body.
    pub json: bool,
    /// The `Accept` header was added by `--json`, not by `-H`.
    pub accept_inferred: bool,
    pub config: TransferConfig,
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data flags only choose POST when nothing picked a method yet.
    pub(crate) fn post_unless_set(&mut self) {
        self.method.get_or_insert_with(|| "POST".to_owned());
    }

    pub(crate) fn set_content_type(&mut self, value: &str) {
        self.headers.set(CONTENT_TYPE, value);
        self.content_type = Some(value.to_owned());
        self.content_type_origin = Some(ContentTypeOrigin::Explicit);
    }

    /// Set `value` unless a content type is already present.
    pub(crate) fn infer_content_type(&mut self, value: &str) {
        if self.content_type.is_some() || self.headers.contains(CONTENT_TYPE) {
            return;
        }
        self.headers.set(CONTENT_TYPE, value);
        self.content_type = Some(value.to_owned());
        self.content_type_origin = Some(ContentTypeOrigin::Inferred);
    }

    /// Replace an inferred content type; explicit ones stay.
    pub(crate) fn override_inferred_content_type(&mut self, value: &str) {
        if self.content_type_origin == Some(ContentTypeOrigin::Inferred) {
            self.headers.set(CONTENT_TYPE, value);
            self.content_type = Some(value.to_owned());
        } else {
            self.infer_content_type(value);
        }
    }

    /// Add `Accept: value` unless some `Accept` header exists.
    pub(crate) fn infer_accept(&mut self, value: &str) {
        if !self.headers.contains(ACCEPT) {
            self.headers.set(ACCEPT, value);
            self.accept_inferred = true;
        }
    }

    /// An explicit `Accept` replaces an inferred one and otherwise adds to
    /// what is there.
    pub(crate) fn set_accept(&mut self, name: String, value: String) {
        if std::mem::take(&mut self.accept_inferred) {
            self.headers.set(name, value);
        } else {
            self.headers.add(name, value);
        }
    }

    pub(crate) fn is_urlencoded(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            ct.get(..FORM_URLENCODED.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FORM_URLENCODED))
        })
    }

    /// Fold `value` into the single `Cookie` header.
    pub(crate) fn merge_cookie_header(&mut self, value: &str) {
        let merged = match self.headers.get(COOKIE) {
            Some(existing) if !existing.is_empty() => format!("{existing}; {value}"),
            _ => value.to_owned(),
        };
        self.headers.set(COOKIE, merged);
    }

    /// Apply the post-parse defaults and freeze the request.
    pub fn finish(mut self) -> Result<Curl> {
        let mut url = self.url.take().ok_or(Error::MissingUrl)?;

        let query_data = if self.get_mode {
            self.move_data_to_query(&mut url)
        } else {
            None
        };

        if self.json {
            self.promote_json_body();
        }

        if let (Some(Body::Raw(raw)), Some(content_type)) = (&mut self.body, &self.content_type) {
            raw.set_content_type(content_type.as_str());
        }
        self.complete_multipart_type();

        let mut cookie_jar = CookieJar::new();
        if !self.cookies.is_empty() {
            cookie_jar.merge(&url, &self.cookies);
        }

        let method = match self.method.take() {
            Some(method) => method,
            None if self.body.as_ref().is_some_and(|body| !body.is_empty()) => "POST".to_owned(),
            None => "GET".to_owned(),
        };
        debug!("finalized {method} {url}");

        Ok(Curl {
            url,
            method,
            headers: self.headers,
            body: self.body,
            cookies: self.cookies,
            cookie_jar,
            auth: self.auth,
            content_type: self.content_type,
            get_mode: self.get_mode,
            query_data,
            config: self.config,
        })
    }

    fn move_data_to_query(&mut self, url: &mut Url) -> Option<String> {
        let Some(Body::Raw(raw)) = &self.body else {
            return None;
        };
        let data = raw.text().into_owned();
        self.body = None;

        if self.content_type_origin == Some(ContentTypeOrigin::Inferred) {
            self.headers.remove(CONTENT_TYPE);
            self.content_type = None;
            self.content_type_origin = None;
        }

        if !data.is_empty() {
            let query = match url.query().filter(|query| !query.is_empty()) {
                Some(existing) => format!("{existing}&{data}"),
                None => data.clone(),
            };
            url.set_query(Some(&query));
        }
        debug!("moved {} bytes of data into the query string", data.len());
        Some(data)
    }

    /// An explicit `multipart/form-data` without a boundary takes the
    /// body's boundary.
    fn complete_multipart_type(&mut self) {
        let Some(Body::Multipart(multipart)) = &self.body else {
            return;
        };
        let needs_boundary = self.content_type_origin == Some(ContentTypeOrigin::Explicit)
            && self.content_type.as_deref().is_some_and(|ct| {
                ct.get(..MULTIPART_FORM_DATA.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MULTIPART_FORM_DATA))
                    && !ct.to_ascii_lowercase().contains("boundary=")
            });
        if needs_boundary {
            let full = multipart.content_type().into_owned();
            self.headers.set(CONTENT_TYPE, full.as_str());
            self.content_type = Some(full);
        }
    }

    fn promote_json_body(&mut self) {
        let Some(Body::Raw(raw)) = &self.body else {
            return;
        };
        let parsed = JsonBody::from_text(&raw.text());
        match parsed {
            Ok(json) => self.body = Some(Body::Json(json)),
            Err(_) => {
                debug!("--json data is not valid JSON, keeping it raw");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::body::{MultipartBody, RawBody};

    fn with_url(url: &str) -> RequestState {
        RequestState {
            url: Some(Url::parse(url).unwrap()),
            ..RequestState::default()
        }
    }

    #[test]
    fn missing_url_fails() {
        assert!(matches!(RequestState::new().finish(), Err(Error::MissingUrl)));
    }

    #[test]
    fn method_defaults() {
        assert_eq!(with_url("http://x").finish().unwrap().method, "GET");

        let mut state = with_url("http://x");
        state.body = Some(Body::Raw(RawBody::new("a=1", None)));
        assert_eq!(state.finish().unwrap().method, "POST");

        let mut state = with_url("http://x");
        state.body = Some(Body::Raw(RawBody::new("", None)));
        assert_eq!(state.finish().unwrap().method, "GET");
    }

    #[test]
    fn explicit_content_type_wins() {
        let mut state = with_url("http://x");
        state.set_content_type("text/csv");
        state.infer_content_type(FORM_URLENCODED);
        state.override_inferred_content_type("application/json");
        assert_eq!(state.headers.get(CONTENT_TYPE), Some("text/csv"));
        assert_eq!(state.content_type.as_deref(), Some("text/csv"));
    }

    #[test]
    fn get_mode_moves_data_to_query() {
        let mut state = with_url("http://x/y?keep=1");
        state.get_mode = true;
        state.infer_content_type(FORM_URLENCODED);
        state.body = Some(Body::Raw(RawBody::new("q=a b&n=2", None)));

        let curl = state.finish().unwrap();
        assert_eq!(curl.url.as_str(), "http://x/y?keep=1&q=a%20b&n=2");
        assert_eq!(curl.query_data.as_deref(), Some("q=a b&n=2"));
        assert!(curl.body.is_none());
        assert!(!curl.headers.contains(CONTENT_TYPE));
        assert_eq!(curl.method, "GET");
    }

    #[rstest]
    #[case("http://x/y", "flag&e=a@b", "http://x/y?flag&e=a@b")]
    #[case("http://x/y?", "k=v", "http://x/y?k=v")]
    #[case("http://x/y?a=%2B", "b=c+d", "http://x/y?a=%2B&b=c+d")]
    fn get_mode_appends_data_as_written(#[case] url: &str, #[case] data: &str, #[case] expected: &str) {
        let mut state = with_url(url);
        state.get_mode = true;
        state.body = Some(Body::Raw(RawBody::new(data, None)));
        assert_eq!(state.finish().unwrap().url.as_str(), expected);
    }

    #[test]
    fn explicit_multipart_type_gets_the_boundary() {
        let mut state = with_url("http://x");
        state.set_content_type("multipart/form-data");
        state.body = Some(Body::Multipart(MultipartBody::new()));
        let curl = state.finish().unwrap();

        let body_type = curl.body.as_ref().unwrap().content_type().into_owned();
        assert!(body_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(curl.headers.get(CONTENT_TYPE), Some(body_type.as_str()));
        assert_eq!(curl.content_type.as_deref(), Some(body_type.as_str()));
    }

    #[test]
    fn explicit_boundary_is_left_alone() {
        let mut state = with_url("http://x");
        state.set_content_type("multipart/form-data; boundary=mine");
        state.body = Some(Body::Multipart(MultipartBody::new()));
        let curl = state.finish().unwrap();
        assert_eq!(
            curl.headers.get(CONTENT_TYPE),
            Some("multipart/form-data; boundary=mine")
        );
    }

    #[test]
    fn explicit_accept_replaces_inferred_one() {
        let mut state = RequestState::new();
        state.infer_accept("application/json");
        state.set_accept("Accept".to_owned(), "text/plain".to_owned());
        state.set_accept("Accept".to_owned(), "text/html".to_owned());
        assert_eq!(
            state.headers.get_all(ACCEPT).collect::<Vec<_>>(),
            vec!["text/plain", "text/html"]
        );
    }

    #[test]
    fn cookies_merge_into_jar() {
        let mut state = with_url("http://x/a/b");
        state.cookies.push(CookieEntry::new("a", "1"));
        let curl = state.finish().unwrap();
        assert_eq!(curl.cookie_jar.cookies("x")[0].path.as_deref(), Some("/a"));
    }

    #[test]
    fn cookie_header_merges() {
        let mut state = RequestState::new();
        state.merge_cookie_header("a=1");
        state.merge_cookie_header("b=2");
        assert_eq!(state.headers.get(COOKIE), Some("a=1; b=2"));
        assert_eq!(state.headers.len(), 1);
    }
}
