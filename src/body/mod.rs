//! Request bodies.
//!
//! [`Body`] is a closed set of variants; each one knows its content type and
//! how to serialize itself through the [`Payload`] trait.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

use serde_json::value::RawValue;
use url::form_urlencoded;

use crate::error::Result;

pub mod mime;
mod multipart;

pub use multipart::{Field, MULTIPART_FORM_DATA, MultipartBody, parse_form_field};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Raw,
    Form,
    Json,
    Multipart,
    Text,
}

impl BodyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Raw => "raw",
            BodyKind::Form => "form",
            BodyKind::Json => "json",
            BodyKind::Multipart => "multipart",
            BodyKind::Text => "text",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Payload {
    fn content_type(&self) -> Cow<'_, str>;

    /// Serialize into `writer`, returning the number of bytes written.
    fn write_to(&self, writer: &mut dyn Write) -> Result<u64>;

    /// Exact number of bytes [`Payload::write_to`] produces.
    fn length(&self) -> Result<u64> {
        self.write_to(&mut io::sink())
    }

    fn kind(&self) -> BodyKind;
}

/// Bytes sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody {
    data: Vec<u8>,
    content_type: String,
}

impl RawBody {
    pub fn new(data: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.unwrap_or(mime::OCTET_STREAM).to_owned(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Append `data`, placing `separator` in between when both sides are
    /// non-empty.
    pub fn append(&mut self, data: &[u8], separator: Option<u8>) {
        if let Some(separator) = separator {
            if !self.data.is_empty() && !data.is_empty() {
                self.data.push(separator);
            }
        }
        self.data.extend_from_slice(data);
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Payload for RawBody {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.content_type.as_str())
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        writer.write_all(&self.data)?;
        Ok(self.data.len() as u64)
    }

    fn length(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Raw
    }
}

/// `application/x-www-form-urlencoded` pairs, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormBody {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Payload for FormBody {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(FORM_URLENCODED)
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        let encoded = self.encode();
        writer.write_all(encoded.as_bytes())?;
        Ok(encoded.len() as u64)
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Form
    }
}

/// A JSON document, kept byte for byte as it was given.
#[derive(Debug, Clone)]
pub struct JsonBody {
    raw: Box<RawValue>,
}

impl JsonBody {
    pub fn new(value: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            raw: serde_json::value::to_raw_value(value)?,
        })
    }

    /// Validate `text` as JSON without re-serializing it.
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self {
            raw: RawValue::from_string(text.to_owned())?,
        })
    }

    pub fn text(&self) -> &str {
        self.raw.get()
    }

    pub fn value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(self.raw.get())?)
    }
}

impl PartialEq for JsonBody {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl Payload for JsonBody {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(JSON)
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        let text = self.text();
        writer.write_all(text.as_bytes())?;
        Ok(text.len() as u64)
    }

    fn length(&self) -> Result<u64> {
        Ok(self.text().len() as u64)
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Json
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBody {
    text: String,
    content_type: String,
}

impl TextBody {
    pub fn new(text: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            text: text.into(),
            content_type: content_type.unwrap_or(TEXT_PLAIN).to_owned(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Payload for TextBody {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.content_type.as_str())
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        writer.write_all(self.text.as_bytes())?;
        Ok(self.text.len() as u64)
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Raw(RawBody),
    Form(FormBody),
    Json(JsonBody),
    Text(TextBody),
    Multipart(MultipartBody),
}

impl Body {
    fn payload(&self) -> &dyn Payload {
        match self {
            Body::Raw(body) => body,
            Body::Form(body) => body,
            Body::Json(body) => body,
            Body::Text(body) => body,
            Body::Multipart(body) => body,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Raw(body) => body.is_empty(),
            Body::Form(body) => body.pairs().is_empty(),
            Body::Json(_) => false,
            Body::Text(body) => body.text().is_empty(),
            Body::Multipart(body) => body.fields().is_empty(),
        }
    }

    pub fn as_raw(&self) -> Option<&RawBody> {
        match self {
            Body::Raw(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultipartBody> {
        match self {
            Body::Multipart(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_multipart_mut(&mut self) -> Option<&mut MultipartBody> {
        match self {
            Body::Multipart(body) => Some(body),
            _ => None,
        }
    }

    /// Serialized bytes, mostly for display and tests.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl Payload for Body {
    fn content_type(&self) -> Cow<'_, str> {
        self.payload().content_type()
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        self.payload().write_to(writer)
    }

    fn length(&self) -> Result<u64> {
        self.payload().length()
    }

    fn kind(&self) -> BodyKind {
        self.payload().kind()
    }
}

impl From<RawBody> for Body {
    fn from(body: RawBody) -> Self {
        Body::Raw(body)
    }
}

impl From<FormBody> for Body {
    fn from(body: FormBody) -> Self {
        Body::Form(body)
    }
}

impl From<JsonBody> for Body {
    fn from(body: JsonBody) -> Self {
        Body::Json(body)
    }
}

impl From<TextBody> for Body {
    fn from(body: TextBody) -> Self {
        Body::Text(body)
    }
}

impl From<MultipartBody> for Body {
    fn from(body: MultipartBody) -> Self {
        Body::Multipart(body)
    }
}
