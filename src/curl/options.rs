//! The option table.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::handlers::{self, Handler};

/// One curl option: every spelling, its argument count and its handler.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub names: &'static [&'static str],
    /// 0 or 1.
    pub arity: usize,
    pub repeatable: bool,
    pub handler: Handler,
}

impl OptionSpec {
    pub const fn new(
        names: &'static [&'static str],
        arity: usize,
        repeatable: bool,
        handler: Handler,
    ) -> Self {
        Self {
            names,
            arity,
            repeatable,
            handler,
        }
    }

    /// The first spelling, used to recognise repeats.
    pub fn canonical(&self) -> &'static str {
        self.names.first().copied().unwrap_or_default()
    }
}

const fn flag(names: &'static [&'static str], handler: Handler) -> OptionSpec {
    OptionSpec::new(names, 0, false, handler)
}

const fn arg(names: &'static [&'static str], handler: Handler) -> OptionSpec {
    OptionSpec::new(names, 1, false, handler)
}

const fn repeated(names: &'static [&'static str], handler: Handler) -> OptionSpec {
    OptionSpec::new(names, 1, true, handler)
}

const STANDARD: &[OptionSpec] = &[
    repeated(&["-H", "--header"], handlers::header),
    arg(&["-X", "--request"], handlers::method),
    flag(&["-G", "--get"], handlers::get),
    flag(&["-I", "--head"], handlers::head),
    arg(&["-d", "--data", "--data-ascii"], handlers::data),
    arg(&["--data-binary"], handlers::data_binary),
    arg(&["--data-urlencode"], handlers::data_urlencode),
    arg(&["--data-raw"], handlers::data_raw),
    arg(&["--json"], handlers::json),
    arg(&["-u", "--user"], handlers::user),
    arg(&["--digest"], handlers::digest),
    arg(&["--ntlm"], handlers::ntlm),
    arg(&["--oauth2-bearer"], handlers::bearer),
    arg(&["-A", "--user-agent"], handlers::user_agent),
    arg(&["-e", "--referer"], handlers::referer),
    flag(&["--compressed"], handlers::compressed),
    repeated(&["-F", "--form"], handlers::form),
    repeated(&["--form-string"], handlers::form_string),
    arg(&["-b", "--cookie"], handlers::cookie),
    flag(&["-k", "--insecure"], handlers::insecure),
    arg(&["--cacert"], handlers::ca_cert),
    arg(&["-E", "--cert"], handlers::client_cert),
    arg(&["--key"], handlers::client_key),
    flag(&["-L", "--location"], handlers::location),
    arg(&["--max-redirs"], handlers::max_redirs),
    arg(&["-m", "--max-time"], handlers::max_time),
    arg(&["--connect-timeout"], handlers::connect_timeout),
    arg(&["-x", "--proxy"], handlers::proxy),
    arg(&["--socks5"], handlers::socks5),
    arg(&["-U", "--proxy-user"], handlers::proxy_user),
    arg(&["--limit-rate"], handlers::limit_rate),
    repeated(&["--resolve"], handlers::resolve),
    repeated(&["--connect-to"], handlers::connect_to),
    arg(&["-o", "--output"], handlers::output),
    flag(&["-O", "--remote-name"], handlers::remote_name),
    arg(&["--output-dir"], handlers::output_dir),
    flag(&["--create-dirs"], handlers::create_dirs),
    arg(&["-C", "--continue-at"], handlers::continue_at),
    flag(&["-J", "--remote-header-name"], handlers::remote_header_name),
    flag(&["--remove-on-error"], handlers::remove_on_error),
    arg(&["-w", "--write-out"], handlers::write_out),
    flag(&["-f", "--fail"], handlers::fail),
    flag(&["-v", "--verbose"], handlers::verbose),
    flag(&["-i", "--include"], handlers::include),
    flag(&["-s", "--silent"], handlers::silent),
    arg(&["--trace"], handlers::trace),
    arg(&["--trace-ascii"], handlers::trace_ascii),
    flag(&["-0", "--http1.0"], handlers::http10),
    flag(&["--http1.1"], handlers::http11),
    flag(&["--http2"], handlers::http2),
];

/// Options that are accepted and skipped, with their argument count.
const IGNORED: &[(&str, usize)] = &[
    ("-S", 0),
    ("--show-error", 0),
    ("-#", 0),
    ("--progress-bar", 0),
    ("--no-progress-meter", 0),
    ("-g", 0),
    ("--globoff", 0),
    ("-N", 0),
    ("--no-buffer", 0),
    ("--path-as-is", 0),
    ("--tcp-nodelay", 0),
    ("--no-keepalive", 0),
    ("--tr-encoding", 0),
    ("--ssl-no-revoke", 0),
    ("-n", 0),
    ("--netrc", 0),
    ("--raw", 0),
    ("--no-sessionid", 0),
    ("--retry", 1),
    ("--retry-delay", 1),
    ("--retry-max-time", 1),
    ("-c", 1),
    ("--cookie-jar", 1),
    ("-D", 1),
    ("--dump-header", 1),
    ("--stderr", 1),
    ("--interface", 1),
    ("--local-port", 1),
    ("--keepalive-time", 1),
    ("--max-filesize", 1),
    ("--ciphers", 1),
    ("-K", 1),
    ("--config", 1),
];

/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: Vec<OptionSpec>,
    index: HashMap<&'static str, usize>,
    ignored: HashMap<&'static str, usize>,
}

impl Registry {
    /// An empty table. Add entries with [`Registry::with_option`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard curl option set.
    pub fn standard() -> Self {
        let registry = STANDARD
            .iter()
            .fold(Self::new(), |registry, spec| registry.with_option(*spec));
        IGNORED
            .iter()
            .fold(registry, |registry, &(name, arity)| registry.with_ignored(name, arity))
    }

    /// Register `spec` under every spelling. A later spec takes over
    /// spellings it shares with an earlier one.
    pub fn with_option(mut self, spec: OptionSpec) -> Self {
        let slot = self.specs.len();
        for &name in spec.names {
            self.ignored.remove(name);
            self.index.insert(name, slot);
        }
        self.specs.push(spec);
        self
    }

    pub fn with_ignored(mut self, name: &'static str, arity: usize) -> Self {
        if !self.index.contains_key(name) {
            self.ignored.insert(name, arity);
        }
        self
    }

    pub fn lookup(&self, flag: &str) -> Option<&OptionSpec> {
        self.index.get(flag).map(|&slot| &self.specs[slot])
    }

    /// Argument count of a known-but-ignored option.
    pub fn ignored_arity(&self, flag: &str) -> Option<usize> {
        self.ignored.get(flag).copied()
    }

    /// Argument count of any option the table knows, handled or ignored.
    pub fn arity(&self, flag: &str) -> Option<usize> {
        self.lookup(flag)
            .map(|spec| spec.arity)
            .or_else(|| self.ignored_arity(flag))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Every handled spelling, sorted.
    pub fn spellings(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.index.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

static DEFAULT: LazyLock<Registry> = LazyLock::new(Registry::standard);

/// The shared standard registry.
pub fn default_registry() -> &'static Registry {
    &DEFAULT
}
