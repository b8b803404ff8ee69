//! Option handlers. Each one receives exactly as many arguments as its
//! registry entry declares.

use url::form_urlencoded;

use super::config::{ContinueAt, DEFAULT_MAX_REDIRS, HttpVersion, TraceOutput};
use super::state::{ACCEPT, CONTENT_TYPE, RequestState};
use super::values;
use crate::auth::{Authentication, split_credentials};
use crate::body::{
    Body, FORM_URLENCODED, Field, JSON, MultipartBody, Payload, RawBody, parse_form_field,
};
use crate::cookie;
use crate::error::{Error, Result};
use crate::files::PayloadReader;

pub type Handler = fn(&mut RequestState, &dyn PayloadReader, &[&str]) -> Result<()>;

const ACCEPT_ENCODING: &str = "gzip, deflate, br";

pub(super) fn header(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let raw = args[0];
    if raw.trim().is_empty() {
        return Ok(());
    }

    let line = values::parse_header_line(raw)?;
    // `Name:` with nothing after it
    if line.value.is_empty() && raw.contains(':') {
        return Ok(());
    }

    if line.name.eq_ignore_ascii_case("cookie") {
        state.merge_cookie_header(&line.value);
        state.cookies.extend(cookie::parse_cookie_string(&line.value));
    } else if line.name.eq_ignore_ascii_case(CONTENT_TYPE) {
        state.set_content_type(&line.value);
    } else if line.name.eq_ignore_ascii_case(ACCEPT) {
        state.set_accept(line.name, line.value);
    } else {
        state.headers.add(line.name, line.value);
    }
    Ok(())
}

pub(super) fn method(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let method = args[0].trim();
    if method.is_empty() {
        return Err(Error::value(args[0], "empty request method"));
    }
    state.method = Some(method.to_ascii_uppercase());
    Ok(())
}

pub(super) fn get(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.method = Some("GET".to_owned());
    state.get_mode = true;
    Ok(())
}

pub(super) fn head(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.method = Some("HEAD".to_owned());
    Ok(())
}

/// How a data flag joins its value onto data already collected.
#[derive(Debug, Clone, Copy)]
enum Join {
    /// `&` while the content type is url-encoded, plain concatenation after
    /// an explicit header changed it.
    Form,
    Ampersand,
    Concat,
}

fn push_data(state: &mut RequestState, data: &[u8], join: Join) -> Result<()> {
    state.post_unless_set();
    state.infer_content_type(FORM_URLENCODED);

    let separator = match join {
        Join::Form if state.is_urlencoded() => Some(b'&'),
        Join::Ampersand => Some(b'&'),
        Join::Form | Join::Concat => None,
    };

    match &mut state.body {
        Some(Body::Raw(raw)) => raw.append(data, separator),
        Some(_) => {
            return Err(Error::value(
                String::from_utf8_lossy(data),
                "data cannot be combined with form fields",
            ));
        }
        None => {
            state.body = Some(Body::Raw(RawBody::new(data, state.content_type.as_deref())));
        }
    }
    Ok(())
}

fn strip_line_breaks(mut data: Vec<u8>) -> Vec<u8> {
    data.retain(|byte| !matches!(byte, b'\r' | b'\n'));
    data
}

/// `-d`, `--data`, `--data-ascii`: `@file` contents lose their line breaks.
pub(super) fn data(state: &mut RequestState, files: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let payload = match args[0].strip_prefix('@') {
        Some(path) => strip_line_breaks(files.read(path)?),
        None => args[0].as_bytes().to_vec(),
    };
    push_data(state, &payload, Join::Form)
}

pub(super) fn data_raw(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    push_data(state, args[0].as_bytes(), Join::Form)
}

/// `--data-binary`: `@file` contents are kept byte for byte.
pub(super) fn data_binary(
    state: &mut RequestState,
    files: &dyn PayloadReader,
    args: &[&str],
) -> Result<()> {
    let payload = match args[0].strip_prefix('@') {
        Some(path) => files.read(path)?,
        None => args[0].as_bytes().to_vec(),
    };
    push_data(state, &payload, Join::Concat)
}

fn urlencode(data: &[u8]) -> String {
    form_urlencoded::byte_serialize(data).collect()
}

/// `--data-urlencode` accepts `content`, `=content`, `name=content`,
/// `@file` and `name@file`.
pub(super) fn data_urlencode(
    state: &mut RequestState,
    files: &dyn PayloadReader,
    args: &[&str],
) -> Result<()> {
    let spec = args[0];
    let encoded = match spec.find(['=', '@']) {
        Some(at) if spec.as_bytes()[at] == b'=' => {
            let (name, content) = (&spec[..at], &spec[at + 1..]);
            prefixed(name, urlencode(content.as_bytes()))
        }
        Some(at) => {
            let (name, path) = (&spec[..at], &spec[at + 1..]);
            prefixed(name, urlencode(&files.read(path)?))
        }
        None => urlencode(spec.as_bytes()),
    };
    push_data(state, encoded.as_bytes(), Join::Ampersand)
}

fn prefixed(name: &str, encoded: String) -> String {
    if name.is_empty() {
        encoded
    } else {
        format!("{name}={encoded}")
    }
}

/// `--json`: like `--data-binary`, with JSON content type and accept headers.
pub(super) fn json(state: &mut RequestState, files: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let payload = match args[0].strip_prefix('@') {
        Some(path) => files.read(path)?,
        None => args[0].as_bytes().to_vec(),
    };
    state.override_inferred_content_type(JSON);
    state.infer_accept(JSON);
    state.json = true;
    push_data(state, &payload, Join::Concat)
}

pub(super) fn user(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.auth = Some(Authentication::basic(args[0])?);
    Ok(())
}

pub(super) fn digest(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.auth = Some(Authentication::digest(args[0])?);
    Ok(())
}

pub(super) fn ntlm(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.auth = Some(Authentication::ntlm(args[0])?);
    Ok(())
}

pub(super) fn bearer(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let token = args[0].trim();
    if token.is_empty() {
        return Err(Error::value(args[0], "empty bearer token"));
    }
    state.auth = Some(Authentication::bearer(token));
    Ok(())
}

pub(super) fn user_agent(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.headers.set("User-Agent", args[0]);
    Ok(())
}

pub(super) fn referer(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.headers.set("Referer", args[0]);
    Ok(())
}

pub(super) fn compressed(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.compressed = true;
    if !state.headers.contains("Accept-Encoding") {
        state.headers.set("Accept-Encoding", ACCEPT_ENCODING);
    }
    Ok(())
}

fn push_field(state: &mut RequestState, field: Field) -> Result<()> {
    state.post_unless_set();

    if state.body.is_none() {
        state.body = Some(Body::Multipart(MultipartBody::new()));
    }
    let Some(Body::Multipart(multipart)) = &mut state.body else {
        return Err(Error::value(
            field.name,
            "form fields cannot be combined with data",
        ));
    };
    multipart.push(field);

    let content_type = multipart.content_type().into_owned();
    state.override_inferred_content_type(&content_type);
    Ok(())
}

/// `-F name=value`, `name=<file`, `name=@file[;type=..][;filename=..]`.
pub(super) fn form(state: &mut RequestState, files: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let field = parse_form_field(args[0], files)?;
    push_field(state, field)
}

/// `--form-string name=value`: the value is never a file reference.
pub(super) fn form_string(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    match args[0].split_once('=') {
        Some((name, value)) if !name.is_empty() => push_field(state, Field::text(name, value)),
        _ => Err(Error::MultipartField(args[0].to_owned())),
    }
}

/// `-b name=value; ...` or `-b @file` (cookie string or Netscape jar). A
/// cookie string reaches the header exactly as written.
pub(super) fn cookie(state: &mut RequestState, files: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let (entries, value) = match args[0].strip_prefix('@') {
        Some(path) => {
            let contents = files.read(path)?;
            let text = String::from_utf8_lossy(&contents);
            if cookie::is_netscape_format(&text) {
                let entries = cookie::parse_netscape(&text);
                let value = entries
                    .iter()
                    .map(|entry| format!("{}={}", entry.name, entry.value))
                    .collect::<Vec<_>>()
                    .join("; ");
                (entries, value)
            } else {
                let text = text.trim();
                (cookie::parse_cookie_string(text), text.to_owned())
            }
        }
        None => {
            let text = args[0].trim();
            (cookie::parse_cookie_string(text), text.to_owned())
        }
    };
    if entries.is_empty() {
        return Ok(());
    }

    state.merge_cookie_header(&value);
    state.cookies.extend(entries);
    Ok(())
}

pub(super) fn insecure(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.insecure = true;
    Ok(())
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::value(value, format!("empty {what}")))
    } else {
        Ok(trimmed)
    }
}

pub(super) fn ca_cert(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.ca_cert = Some(non_empty(args[0], "certificate path")?.to_owned());
    Ok(())
}

pub(super) fn client_cert(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.client_cert = Some(non_empty(args[0], "certificate path")?.to_owned());
    Ok(())
}

pub(super) fn client_key(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.client_key = Some(non_empty(args[0], "key path")?.to_owned());
    Ok(())
}

pub(super) fn location(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.follow_redirects = true;
    state.config.max_redirs.get_or_insert(DEFAULT_MAX_REDIRS);
    Ok(())
}

pub(super) fn max_redirs(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.max_redirs = Some(values::parse_count(args[0])?);
    Ok(())
}

pub(super) fn max_time(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.timeout = Some(values::parse_duration(args[0])?);
    Ok(())
}

pub(super) fn connect_timeout(
    state: &mut RequestState,
    _: &dyn PayloadReader,
    args: &[&str],
) -> Result<()> {
    state.config.connect_timeout = Some(values::parse_duration(args[0])?);
    Ok(())
}

pub(super) fn proxy(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.proxy = Some(non_empty(args[0], "proxy")?.to_owned());
    Ok(())
}

pub(super) fn socks5(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let address = non_empty(args[0], "proxy")?;
    let proxy = if address.starts_with("socks5://") {
        address.to_owned()
    } else {
        format!("socks5://{address}")
    };
    state.config.proxy = Some(proxy);
    Ok(())
}

pub(super) fn proxy_user(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let (user, password) = split_credentials(args[0])?;
    state.config.proxy_user = Some(user.to_owned());
    state.config.proxy_password = Some(password.to_owned());
    Ok(())
}

pub(super) fn limit_rate(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.limit_rate = Some(values::parse_rate(args[0])?);
    Ok(())
}

pub(super) fn resolve(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.resolve.push(values::parse_resolve(args[0])?);
    Ok(())
}

pub(super) fn connect_to(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.connect_to.push(values::parse_connect_to(args[0])?);
    Ok(())
}

pub(super) fn output(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.output.file = Some(non_empty(args[0], "output path")?.to_owned());
    Ok(())
}

pub(super) fn remote_name(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.output.remote_name = true;
    Ok(())
}

pub(super) fn output_dir(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.output.output_dir = Some(non_empty(args[0], "output directory")?.to_owned());
    Ok(())
}

pub(super) fn create_dirs(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.output.create_dirs = true;
    Ok(())
}

pub(super) fn continue_at(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    let at = match args[0].trim() {
        "-" => ContinueAt::Auto,
        offset => ContinueAt::Offset(values::parse_offset(offset)?),
    };
    state.config.output.continue_at = Some(at);
    Ok(())
}

pub(super) fn remote_header_name(
    state: &mut RequestState,
    _: &dyn PayloadReader,
    _: &[&str],
) -> Result<()> {
    state.config.output.remote_header_name = true;
    Ok(())
}

pub(super) fn remove_on_error(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.output.remove_on_error = true;
    Ok(())
}

pub(super) fn write_out(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.write_out = Some(args[0].to_owned());
    Ok(())
}

pub(super) fn fail(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.fail_on_error = true;
    Ok(())
}

pub(super) fn verbose(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.verbose = true;
    Ok(())
}

pub(super) fn include(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.include = true;
    Ok(())
}

pub(super) fn silent(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.silent = true;
    Ok(())
}

pub(super) fn trace(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.trace = Some(TraceOutput {
        path: non_empty(args[0], "trace path")?.to_owned(),
        ascii: false,
    });
    Ok(())
}

pub(super) fn trace_ascii(state: &mut RequestState, _: &dyn PayloadReader, args: &[&str]) -> Result<()> {
    state.config.trace = Some(TraceOutput {
        path: non_empty(args[0], "trace path")?.to_owned(),
        ascii: true,
    });
    Ok(())
}

pub(super) fn http10(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.http_version = HttpVersion::Http10;
    Ok(())
}

pub(super) fn http11(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.http_version = HttpVersion::Http11;
    Ok(())
}

pub(super) fn http2(state: &mut RequestState, _: &dyn PayloadReader, _: &[&str]) -> Result<()> {
    state.config.http_version = HttpVersion::Http2;
    Ok(())
}
