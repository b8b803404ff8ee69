use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which quote was left open when the command text ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
    AnsiC,
}

impl std::fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            QuoteKind::Single => "single",
            QuoteKind::Double => "double",
            QuoteKind::AnsiC => "ANSI-C",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to tokenize curl command: unclosed {0} quote")]
    Tokenize(QuoteKind),

    #[error("unsupported or unknown option: {0}")]
    UnknownOption(String),

    #[error("option {flag} requires {expected} argument(s), but not enough provided")]
    Arity { flag: String, expected: usize },

    #[error("invalid value {value:?}: {reason}")]
    ValueFormat { value: String, reason: String },

    #[error("no URL specified in command")]
    MissingUrl,

    #[error("multiple URLs provided or misplaced argument: {0}")]
    MultipleUrl(String),

    #[error("invalid or malformed URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid form field {0:?}: expected name=value")]
    MultipartField(String),

    #[error("failed to serialize body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write body: {0}")]
    Io(#[from] io::Error),

    /// A handler failed; `flag` is the spelling used on the command line.
    #[error("error processing option {flag}: {source}")]
    Option {
        flag: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn value(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ValueFormat {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn in_option(self, flag: &str) -> Self {
        Error::Option {
            flag: flag.to_owned(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping the option wrapper.
    pub fn root(&self) -> &Error {
        match self {
            Error::Option { source, .. } => source.root(),
            other => other,
        }
    }
}
