use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;
use rand::distr::Alphanumeric;

use super::{BodyKind, Payload};
use crate::body::mime;
use crate::error::{Error, Result};
use crate::files::PayloadReader;

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Literal text, or the upload path when `is_file` is set.
    pub value: String,
    pub is_file: bool,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    /// File bytes, once loaded with [`MultipartBody::load_files`].
    pub contents: Option<Vec<u8>>,
}

impl Field {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_file: false,
            filename: None,
            mime_type: None,
            contents: None,
        }
    }

    /// An upload of `path`; the filename and MIME type come from the path.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let filename = Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        Self {
            name: name.into(),
            mime_type: Some(mime::from_path(&path).to_owned()),
            filename: Some(filename),
            value: path,
            is_file: true,
            contents: None,
        }
    }

    fn payload(&self) -> &[u8] {
        match &self.contents {
            Some(contents) => contents,
            None => self.value.as_bytes(),
        }
    }
}

/// Parse a `-F` argument: `name=value`, `name=<file` (file content as the
/// value) or `name=@file[;type=mime][;filename=name]`.
pub fn parse_form_field(spec: &str, files: &dyn PayloadReader) -> Result<Field> {
    let Some((name, value)) = spec.split_once('=') else {
        return Err(Error::MultipartField(spec.to_owned()));
    };
    if name.is_empty() {
        return Err(Error::MultipartField(spec.to_owned()));
    }

    if let Some(file_spec) = value.strip_prefix('@') {
        let mut params = file_spec.split(';');
        let path = params.next().unwrap_or_default();
        if path.is_empty() {
            return Err(Error::MultipartField(spec.to_owned()));
        }

        let mut field = Field::file(name, path);
        for param in params.map(str::trim) {
            if let Some(mime_type) = param.strip_prefix("type=") {
                field.mime_type = Some(mime_type.to_owned());
            } else if let Some(filename) = param.strip_prefix("filename=") {
                field.filename = Some(filename.trim_matches('"').to_owned());
            }
        }
        return Ok(field);
    }

    if let Some(path) = value.strip_prefix('<') {
        let contents = files.read(path)?;
        return Ok(Field::text(name, String::from_utf8_lossy(&contents)));
    }

    Ok(Field::text(name, value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    fields: Vec<Field>,
    boundary: String,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::with_fields(Vec::new())
    }

    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            boundary: generate_boundary(),
        }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Read every file field through `files` so the body carries the file
    /// bytes instead of the path.
    pub fn load_files(&mut self, files: &dyn PayloadReader) -> Result<()> {
        for field in self.fields.iter_mut().filter(|field| field.is_file) {
            if field.contents.is_none() {
                field.contents = Some(files.read(&field.value)?);
            }
        }
        Ok(())
    }
}

impl Payload for MultipartBody {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{MULTIPART_FORM_DATA}; boundary={}", self.boundary))
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<u64> {
        let mut out = Counter {
            inner: writer,
            written: 0,
        };

        for field in &self.fields {
            write!(out, "--{}\r\n", self.boundary)?;
            if field.is_file {
                write!(
                    out,
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    escape_quotes(&field.name),
                    escape_quotes(field.filename.as_deref().unwrap_or_default())
                )?;
                if let Some(mime_type) = field.mime_type.as_deref().filter(|m| !m.is_empty()) {
                    write!(out, "Content-Type: {mime_type}\r\n")?;
                }
            } else {
                write!(
                    out,
                    "Content-Disposition: form-data; name=\"{}\"\r\n",
                    escape_quotes(&field.name)
                )?;
            }
            out.write_all(b"\r\n")?;
            out.write_all(field.payload())?;
            out.write_all(b"\r\n")?;
        }
        write!(out, "--{}--\r\n", self.boundary)?;

        Ok(out.written)
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Multipart
    }
}

struct Counter<'a> {
    inner: &'a mut dyn Write,
    written: u64,
}

impl Write for Counter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn escape_quotes(value: &str) -> Cow<'_, str> {
    if value.contains(['\\', '"']) {
        Cow::Owned(value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        Cow::Borrowed(value)
    }
}

fn generate_boundary() -> String {
    let noise: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(30)
        .map(char::from)
        .collect();
    format!("curlreq-{noise}")
}
