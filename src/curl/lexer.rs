use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, QuoteKind, Result};

/// One shell word of the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, quoted: bool) -> Self {
        Self {
            text: text.into(),
            quoted,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when any part of the word came from a quoted literal, which is
    /// what keeps `''` alive as an empty argument.
    pub fn quoted(&self) -> bool {
        self.quoted
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    InArgument,
    InSingleQuotes,
    InDoubleQuotes,
    InAnsiCQuotes,
}

/// Identify the ending pattern: `\` followed by a line break.
pub fn join_continuations(input: &str) -> Cow<'_, str> {
    if !input.contains("\\\n") && !input.contains("\\\r\n") {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\\\r\n", " ").replace("\\\n", " "))
}

/// Split a bash-quoted command line into words.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let input = join_continuations(input);
    let mut lexer = Lexer::default();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        lexer.step(c, &mut chars);
    }

    lexer.finish()
}

struct Lexer {
    state: State,
    buf: String,
    quoted: bool,
    // last char pushed was an unquoted `$`
    dollar: bool,
    tokens: Vec<Token>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self {
            state: State::Default,
            buf: String::new(),
            quoted: false,
            dollar: false,
            tokens: Vec::new(),
        }
    }
}

impl Lexer {
    fn step(&mut self, c: char, rest: &mut Peekable<Chars<'_>>) {
        match self.state {
            State::Default => {
                if !c.is_whitespace() {
                    self.state = State::InArgument;
                    self.in_argument(c, rest);
                }
            }
            State::InArgument => self.in_argument(c, rest),
            State::InSingleQuotes => match c {
                '\'' => self.state = State::InArgument,
                _ => self.buf.push(c),
            },
            State::InDoubleQuotes => match c {
                '"' => self.state = State::InArgument,
                '\\' => {
                    if let Some(next) = rest.next() {
                        self.buf.push(next);
                    }
                }
                _ => self.buf.push(c),
            },
            State::InAnsiCQuotes => match c {
                '\'' => self.state = State::InArgument,
                '\\' => match rest.next() {
                    Some('r') => self.buf.push('\r'),
                    Some('n') => self.buf.push('\n'),
                    Some('t') => self.buf.push('\t'),
                    Some('\'') => self.buf.push('\''),
                    Some('\\') => self.buf.push('\\'),
                    Some(other) => {
                        self.buf.push('\\');
                        self.buf.push(other);
                    }
                    None => self.buf.push('\\'),
                },
                _ => self.buf.push(c),
            },
        }
    }

    fn in_argument(&mut self, c: char, rest: &mut Peekable<Chars<'_>>) {
        let dollar = std::mem::take(&mut self.dollar);
        match c {
            '\'' if dollar => {
                self.buf.pop();
                self.state = State::InAnsiCQuotes;
                self.quoted = true;
            }
            '\'' => {
                self.state = State::InSingleQuotes;
                self.quoted = true;
            }
            '"' => {
                self.state = State::InDoubleQuotes;
                self.quoted = true;
            }
            '\\' => {
                if let Some(next) = rest.next() {
                    self.buf.push(next);
                }
            }
            c if c.is_whitespace() => {
                self.finalize();
                self.state = State::Default;
            }
            c => {
                self.buf.push(c);
                self.dollar = c == '$';
            }
        }
    }

    fn finalize(&mut self) {
        if !self.buf.is_empty() || self.quoted {
            self.tokens
                .push(Token::new(std::mem::take(&mut self.buf), self.quoted));
        }
        self.quoted = false;
        self.dollar = false;
    }

    fn finish(mut self) -> Result<Vec<Token>> {
        let open = match self.state {
            State::InSingleQuotes => Some(QuoteKind::Single),
            State::InDoubleQuotes => Some(QuoteKind::Double),
            State::InAnsiCQuotes => Some(QuoteKind::AnsiC),
            State::Default | State::InArgument => None,
        };
        if let Some(kind) = open {
            return Err(Error::Tokenize(kind));
        }
        self.finalize();
        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_util::texts;

    #[rstest]
    #[case(r"'a\\b\c'", r"a\\b\c")]
    #[case(r#"'rakulang "rocks"'"#, r#"rakulang "rocks""#)]
    #[case(r#""rakulang 'rocks'""#, "rakulang 'rocks'")]
    #[case(r#""a \"b\" c""#, r#"a "b" c"#)]
    #[case(r#""keep \\ one""#, r"keep \ one")]
    #[case(r#"foo'bar'"baz""#, "foobarbaz")]
    #[case(r"plain\ space", "plain space")]
    #[case(r"\$'x'", "$x")]
    fn single_word(#[case] input: &str, #[case] expected: &str) {
        let tokens = tokenize(input).unwrap();
        assert_eq!(texts(&tokens), vec![expected]);
    }

    #[rstest]
    #[case(r"$'a\nb'", "a\nb")]
    #[case(r"$'tab\there'", "tab\there")]
    #[case(r"$'cr\r'", "cr\r")]
    #[case(r"$'it\'s'", "it's")]
    #[case(r"$'back\\slash'", r"back\slash")]
    #[case(r"$'keep\qthis'", r"keep\qthis")]
    #[case(r"pre$'\n'post", "pre\npost")]
    fn ansi_c_quotes(#[case] input: &str, #[case] expected: &str) {
        let tokens = tokenize(input).unwrap();
        assert_eq!(texts(&tokens), vec![expected]);
    }

    #[test]
    fn whitespace_runs_collapse() {
        let tokens = tokenize(" \t curl   -H\t'Accept: */*' \r\n  http://x  ").unwrap();
        assert_eq!(texts(&tokens), vec!["curl", "-H", "Accept: */*", "http://x"]);
    }

    #[test]
    fn line_continuations_become_spaces() {
        let input = "curl 'http://x' \\\n  -H 'A: 1' \\\r\n  --insecure";
        let tokens = tokenize(input).unwrap();
        assert_eq!(texts(&tokens), vec!["curl", "http://x", "-H", "A: 1", "--insecure"]);
    }

    #[test]
    fn empty_quotes_are_arguments() {
        let tokens = tokenize(r#"-d '' -H "" x ''"#).unwrap();
        assert_eq!(texts(&tokens), vec!["-d", "", "-H", "", "x", ""]);
        assert!(tokens[1].quoted());
        assert!(!tokens[4].quoted());
    }

    #[test]
    fn newlines_inside_quotes_are_literal() {
        let tokens = tokenize("-d 'a\nb' \"c\nd\"").unwrap();
        assert_eq!(texts(&tokens), vec!["-d", "a\nb", "c\nd"]);
    }

    #[rstest]
    #[case("curl 'http://x", QuoteKind::Single)]
    #[case("curl \"http://x", QuoteKind::Double)]
    #[case("curl $'http://x", QuoteKind::AnsiC)]
    fn unterminated_quote_is_an_error(#[case] input: &str, #[case] kind: QuoteKind) {
        match tokenize(input) {
            Err(Error::Tokenize(open)) => assert_eq!(open, kind),
            other => panic!("expected tokenize error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("   \n ").unwrap().is_empty());
    }
}
