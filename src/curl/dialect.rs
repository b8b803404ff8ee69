//! Windows `cmd` quoting, as produced by "Copy as cURL (cmd)".
//!
//! The cmd form is rewritten into the bash form before tokenization, so there
//! is only one lexer.

use std::borrow::Cow;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dialect {
    /// Pick cmd when the text carries caret escapes, bash otherwise.
    #[default]
    Auto,
    Bash,
    Cmd,
}

const CMD_MARKERS: [&str; 5] = ["-H ^\"", "^\n", "^\r\n", "^\\^", "^%^"];

pub fn is_cmd_format(input: &str) -> bool {
    CMD_MARKERS.iter().any(|marker| input.contains(marker))
}

impl Dialect {
    pub fn resolve(self, input: &str) -> Dialect {
        match self {
            Dialect::Auto if is_cmd_format(input) => Dialect::Cmd,
            Dialect::Auto => Dialect::Bash,
            other => other,
        }
    }

    /// Rewrite `input` into bash quoting.
    pub fn to_bash(self, input: &str) -> Cow<'_, str> {
        match self.resolve(input) {
            Dialect::Cmd => Cow::Owned(cmd_to_bash(input)),
            _ => Cow::Borrowed(input),
        }
    }
}

/// `^\^X` yields `X`, `^%^` yields `%`, `^"` becomes `'`, any other `^X`
/// yields `X`.
pub fn cmd_to_bash(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '^' {
            out.push(c);
            i += 1;
            continue;
        }

        let window = &chars[i..];
        let at = |offset: usize| window.get(offset).copied();
        if let (Some('\\'), Some('^'), Some(escaped)) = (at(1), at(2), at(3)) {
            out.push(escaped);
            i += 4;
        } else if at(1) == Some('%') && at(2) == Some('^') {
            out.push('%');
            i += 3;
        } else if at(1) == Some('"') {
            out.push('\'');
            i += 2;
        } else if let Some(next) = at(1) {
            out.push(next);
            i += 2;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}
