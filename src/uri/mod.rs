//! Validation of the URL argument.

pub mod protocol;

use url::Url;
use winnow::combinator::terminated;
use winnow::token::{one_of, take_while};
use winnow::{ModalResult, Parser};

use crate::error::{Error, Result};
pub use protocol::Scheme;

/// Drop embedded CR, LF and TAB, then trim.
pub fn clean_url(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect::<String>()
        .trim()
        .to_owned()
}

fn scheme<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    terminated(
        (
            one_of(|c: char| c.is_ascii_alphabetic()),
            take_while(0.., |c: char| {
                c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
            }),
        )
            .take(),
        "://",
    )
    .parse_next(input)
}

/// The scheme in front of `://`, if the text has one.
pub fn scheme_of(raw: &str) -> Option<&str> {
    let mut input = raw;
    scheme.parse_next(&mut input).ok()
}

/// Clean and validate a URL argument: it needs a `scheme://` prefix, and a
/// host when the scheme is http or https.
pub fn parse_url(raw: &str) -> Result<Url> {
    let cleaned = clean_url(raw);
    let invalid = || Error::InvalidUrl(raw.to_owned());

    let name = scheme_of(&cleaned).ok_or_else(invalid)?;
    let url = Url::parse(&cleaned).map_err(|_| invalid())?;
    if Scheme::from(name).requires_host() && url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(url)
}
