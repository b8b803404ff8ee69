use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::Curl;
use super::dialect::Dialect;
use super::lexer::{Token, tokenize};
use super::options::{OptionSpec, Registry, default_registry};
use super::state::RequestState;
use crate::error::{Error, Result};
use crate::files::{FsReader, PayloadReader};
use crate::log::{debug, trace, warning};
use crate::uri;

/// Turns command text into a [`Curl`] request.
///
/// A parser holds no per-call state, so one instance can serve any number of
/// threads.
#[derive(Clone)]
pub struct Parser<'r> {
    registry: &'r Registry,
    dialect: Dialect,
    reader: Arc<dyn PayloadReader>,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("options", &self.registry.len())
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            dialect: Dialect::Auto,
            reader: Arc::new(FsReader),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Serve `@file` payloads from `reader` instead of the filesystem.
    pub fn with_reader(mut self, reader: impl PayloadReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    /// Split `input` into words after rewriting cmd quoting when needed.
    pub fn tokens(&self, input: &str) -> Result<Vec<Token>> {
        let dialect = self.dialect.resolve(input);
        debug!("parsing command as {dialect:?}");
        let tokens = tokenize(&dialect.to_bash(input))?;
        trace!("{} tokens", tokens.len());
        Ok(tokens)
    }

    pub fn parse(&self, input: &str) -> Result<Curl> {
        let tokens = self.tokens(input)?;
        self.parse_tokens(&tokens)
    }

    /// Walk `tokens` in order and finalize the request.
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<Curl> {
        let mut state = RequestState::new();
        let mut seen = HashSet::new();

        let mut i = match tokens.first() {
            Some(first) if first.text().eq_ignore_ascii_case("curl") => 1,
            _ => 0,
        };

        while i < tokens.len() {
            let token = tokens[i].text();
            if !token.starts_with('-') {
                if state.url.is_some() {
                    return Err(Error::MultipleUrl(token.to_owned()));
                }
                state.url = Some(uri::parse_url(token)?);
                i += 1;
                continue;
            }
            i = self.dispatch(&mut state, &mut seen, tokens, i)?;
        }

        state.finish()
    }

    /// Handle the option at `tokens[i]` and return the index after it and
    /// its arguments.
    fn dispatch(
        &self,
        state: &mut RequestState,
        seen: &mut HashSet<&'static str>,
        tokens: &[Token],
        i: usize,
    ) -> Result<usize> {
        let flag = tokens[i].text();

        if let Some(spec) = self.registry.lookup(flag) {
            let end = i + 1 + spec.arity;
            if end > tokens.len() {
                return Err(Error::Arity {
                    flag: flag.to_owned(),
                    expected: spec.arity,
                });
            }
            let args: Vec<&str> = tokens[i + 1..end].iter().map(Token::text).collect();
            self.apply(state, seen, spec, flag, &args)?;
            return Ok(end);
        }

        if let Some(arity) = self.registry.ignored_arity(flag) {
            debug!("skipping ignored option {flag}");
            if i + 1 + arity > tokens.len() {
                return Err(Error::Arity {
                    flag: flag.to_owned(),
                    expected: arity,
                });
            }
            return Ok(i + 1 + arity);
        }

        match self.expand_cluster(tokens, i)? {
            Some((steps, end)) => {
                for step in steps {
                    if let Some(spec) = step.spec {
                        let args: Vec<&str> = step.value.into_iter().collect();
                        self.apply(state, seen, spec, &step.flag, &args)?;
                    }
                }
                Ok(end)
            }
            None => Err(Error::UnknownOption(flag.to_owned())),
        }
    }

    fn apply(
        &self,
        state: &mut RequestState,
        seen: &mut HashSet<&'static str>,
        spec: &OptionSpec,
        flag: &str,
        args: &[&str],
    ) -> Result<()> {
        if !seen.insert(spec.canonical()) && !spec.repeatable {
            warning!("{flag} given more than once");
        }
        trace!("{flag} {args:?}");
        (spec.handler)(state, self.reader.as_ref(), args).map_err(|err| err.in_option(flag))
    }

    /// Expand `-sSL` into `-s -S -L` and split `-XPOST` into `-X POST`. A
    /// one-argument letter takes the rest of the token, or the next token
    /// when it is the last letter.
    fn expand_cluster<'t>(
        &self,
        tokens: &'t [Token],
        i: usize,
    ) -> Result<Option<(Vec<ClusterStep<'t, 'r>>, usize)>> {
        let token = tokens[i].text();
        let Some(letters) = token.strip_prefix('-') else {
            return Ok(None);
        };
        if letters.starts_with('-') || letters.chars().count() < 2 {
            return Ok(None);
        }

        let mut steps = Vec::new();
        let mut end = i + 1;
        for (offset, letter) in letters.char_indices() {
            let flag = format!("-{letter}");
            let spec = self.registry.lookup(&flag);
            let Some(arity) = self.registry.arity(&flag) else {
                return Ok(None);
            };

            if arity == 0 {
                steps.push(ClusterStep { flag, spec, value: None });
                continue;
            }

            let attached = &letters[offset + letter.len_utf8()..];
            let value = if attached.is_empty() {
                let next = tokens.get(end).ok_or_else(|| Error::Arity {
                    flag: token.to_owned(),
                    expected: arity,
                })?;
                end += 1;
                next.text()
            } else {
                attached
            };
            steps.push(ClusterStep { flag, spec, value: Some(value) });
            break;
        }

        debug!("expanded {token} into {} options", steps.len());
        Ok(Some((steps, end)))
    }
}

/// One letter of a short-option cluster. `spec` is `None` for ignored
/// options.
struct ClusterStep<'t, 'r> {
    flag: String,
    spec: Option<&'r OptionSpec>,
    value: Option<&'t str>,
}

/// Parse with the shared standard registry, guessing the dialect.
pub fn parse(input: &str) -> Result<Curl> {
    Parser::default().parse(input)
}

pub fn parse_bash(input: &str) -> Result<Curl> {
    Parser::default().with_dialect(Dialect::Bash).parse(input)
}

pub fn parse_cmd(input: &str) -> Result<Curl> {
    Parser::default().with_dialect(Dialect::Cmd).parse(input)
}
