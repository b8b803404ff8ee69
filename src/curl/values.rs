//! Parsers for option arguments that carry structure: durations, header
//! lines, host mappings and rates.

use std::fmt;
use std::time::Duration;

use winnow::ascii::digit1;
use winnow::combinator::{alt, eof, opt, repeat, separated_pair, terminated};
use winnow::token::{one_of, rest, take_till};
use winnow::{ModalResult, Parser};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Unit {
    Millis,
    Seconds,
    Minutes,
    Hours,
}

impl Unit {
    fn scale(self, value: f64) -> std::result::Result<Duration, std::time::TryFromFloatSecsError> {
        let seconds = match self {
            Unit::Millis => value / 1000.0,
            Unit::Seconds => value,
            Unit::Minutes => value * 60.0,
            Unit::Hours => value * 3600.0,
        };
        Duration::try_from_secs_f64(seconds)
    }
}

fn decimal(input: &mut &str) -> ModalResult<f64> {
    (digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)
}

fn unit(input: &mut &str) -> ModalResult<Unit> {
    alt((
        "ms".value(Unit::Millis),
        "s".value(Unit::Seconds),
        "m".value(Unit::Minutes),
        "h".value(Unit::Hours),
    ))
    .parse_next(input)
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    alt((
        terminated(decimal, eof).try_map(|secs| Unit::Seconds.scale(secs)),
        repeat(1.., (decimal, unit).try_map(|(value, unit)| unit.scale(value)))
            .fold(|| Duration::ZERO, |acc: Duration, part| acc.saturating_add(part)),
    ))
    .parse_next(input)
}

/// `30`, `2.5`, `30s`, `500ms`, `5m`, `1h30m`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    duration.parse(value.trim()).map_err(|_| {
        Error::value(
            value,
            "expected non-negative seconds or a duration such as 30s, 5m, 1h",
        )
    })
}

fn count(input: &mut &str) -> ModalResult<u32> {
    digit1.try_map(str::parse::<u32>).parse_next(input)
}

pub fn parse_count(value: &str) -> Result<u32> {
    count
        .parse(value.trim())
        .map_err(|_| Error::value(value, "expected a non-negative integer"))
}

fn offset(input: &mut &str) -> ModalResult<u64> {
    digit1.try_map(str::parse::<u64>).parse_next(input)
}

/// A byte offset for `-C`.
pub fn parse_offset(value: &str) -> Result<u64> {
    offset
        .parse(value.trim())
        .map_err(|_| Error::value(value, "expected a byte offset or '-'"))
}

fn rate(input: &mut &str) -> ModalResult<u64> {
    (
        digit1.try_map(str::parse::<u64>),
        opt(one_of(['k', 'K', 'm', 'M', 'g', 'G'])),
    )
        .verify_map(|(amount, suffix)| {
            let factor: u64 = match suffix {
                Some('k' | 'K') => 1 << 10,
                Some('m' | 'M') => 1 << 20,
                Some('g' | 'G') => 1 << 30,
                _ => 1,
            };
            amount.checked_mul(factor)
        })
        .parse_next(input)
}

/// Bytes per second from `200`, `100K`, `1M`, `2g`.
pub fn parse_rate(value: &str) -> Result<u64> {
    rate.parse(value.trim())
        .map_err(|_| Error::value(value, "expected a byte rate such as 200K or 1M"))
}

/// A `-H` argument split into name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub name: String,
    pub value: String,
}

fn header_line<'i>(input: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    separated_pair(take_till(1.., ':'), ':', rest).parse_next(input)
}

/// `Name: value`, or curl's `Name;` for a header with an empty value.
pub fn parse_header_line(raw: &str) -> Result<HeaderLine> {
    if let Ok((name, value)) = header_line.parse(raw) {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(HeaderLine {
                name: name.to_owned(),
                value: value.trim().to_owned(),
            });
        }
    } else if let Some(name) = raw.trim().strip_suffix(';') {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(HeaderLine {
                name: name.to_owned(),
                value: String::new(),
            });
        }
    }
    Err(Error::value(raw, "expected a header such as 'Name: value'"))
}

/// One `--resolve` entry: `[+]host:port:addr[,addr]...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveEntry {
    /// Leading `+`: replace an existing cache entry.
    pub force: bool,
    pub host: String,
    pub port: u16,
    pub addresses: Vec<String>,
}

fn port(input: &mut &str) -> ModalResult<u16> {
    digit1.try_map(str::parse::<u16>).parse_next(input)
}

fn resolve_entry(input: &mut &str) -> ModalResult<ResolveEntry> {
    (opt('+'), take_till(1.., ':'), ':', port, ':', rest)
        .verify_map(|(force, host, _, port, _, addresses)| {
            let addresses: Vec<String> = addresses
                .split(',')
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(str::to_owned)
                .collect();
            (!addresses.is_empty()).then(|| ResolveEntry {
                force: force.is_some(),
                host: host.to_owned(),
                port,
                addresses,
            })
        })
        .parse_next(input)
}

pub fn parse_resolve(value: &str) -> Result<ResolveEntry> {
    resolve_entry
        .parse(value.trim())
        .map_err(|_| Error::value(value, "expected [+]host:port:address[,address]..."))
}

impl fmt::Display for ResolveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.force {
            f.write_str("+")?;
        }
        write!(f, "{}:{}:{}", self.host, self.port, self.addresses.join(","))
    }
}

/// One `--connect-to` entry: `HOST1:PORT1:HOST2:PORT2`. An empty source
/// host or port matches anything; an empty target port keeps the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTo {
    pub source_host: Option<String>,
    pub source_port: Option<u16>,
    pub target_host: String,
    pub target_port: Option<u16>,
}

impl ConnectTo {
    pub fn matches(&self, host: &str, port: u16) -> bool {
        self.source_host
            .as_deref()
            .is_none_or(|source| source.eq_ignore_ascii_case(host))
            && self.source_port.is_none_or(|source| source == port)
    }
}

fn host<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((('[', take_till(1.., ']'), ']').take(), take_till(0.., ':'))).parse_next(input)
}

fn connect_to(input: &mut &str) -> ModalResult<ConnectTo> {
    (
        host,
        ':',
        opt(port),
        ':',
        host.verify(|target: &str| !target.is_empty()),
        ':',
        opt(port),
    )
        .map(|(source_host, _, source_port, _, target_host, _, target_port)| ConnectTo {
            source_host: (!source_host.is_empty()).then(|| source_host.to_owned()),
            source_port,
            target_host: target_host.to_owned(),
            target_port,
        })
        .parse_next(input)
}

pub fn parse_connect_to(value: &str) -> Result<ConnectTo> {
    connect_to
        .parse(value.trim())
        .map_err(|_| Error::value(value, "expected HOST1:PORT1:HOST2:PORT2"))
}

impl fmt::Display for ConnectTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let port = |p: Option<u16>| p.map(|p| p.to_string()).unwrap_or_default();
        write!(
            f,
            "{}:{}:{}:{}",
            self.source_host.as_deref().unwrap_or_default(),
            port(self.source_port),
            self.target_host,
            port(self.target_port)
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("60", Duration::from_secs(60))]
    #[case("2.5", Duration::from_millis(2500))]
    #[case("45s", Duration::from_secs(45))]
    #[case("2m", Duration::from_secs(120))]
    #[case("1h", Duration::from_secs(3600))]
    #[case("500ms", Duration::from_millis(500))]
    #[case("1h30m", Duration::from_secs(5400))]
    #[case(" 10 ", Duration::from_secs(10))]
    fn durations(#[case] input: &str, #[case] expected: Duration) {
        assert_eq!(parse_duration(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-5")]
    #[case("abc")]
    #[case("10x")]
    #[case("s")]
    fn bad_durations(#[case] input: &str) {
        assert!(matches!(
            parse_duration(input),
            Err(Error::ValueFormat { .. })
        ));
    }

    #[rstest]
    #[case("200", 200)]
    #[case("100K", 100 * 1024)]
    #[case("1m", 1024 * 1024)]
    #[case("2G", 2 * 1024 * 1024 * 1024)]
    fn rates(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_rate(input).unwrap(), expected);
    }

    #[rstest]
    #[case("Accept: */*", "Accept", "*/*")]
    #[case("  X-Id :  42  ", "X-Id", "42")]
    #[case("Referer: http://a/b?c=d", "Referer", "http://a/b?c=d")]
    #[case("X-Empty:", "X-Empty", "")]
    #[case("X-Blank;", "X-Blank", "")]
    fn header_lines(#[case] input: &str, #[case] name: &str, #[case] value: &str) {
        let line = parse_header_line(input).unwrap();
        assert_eq!((line.name.as_str(), line.value.as_str()), (name, value));
    }

    #[rstest]
    #[case("no colon")]
    #[case(": value only")]
    #[case(";")]
    fn bad_header_lines(#[case] input: &str) {
        assert!(parse_header_line(input).is_err());
    }

    #[test]
    fn resolve_entries() {
        let entry = parse_resolve("api.example.com:443:192.168.1.100,192.168.1.101").unwrap();
        assert!(!entry.force);
        assert_eq!(entry.host, "api.example.com");
        assert_eq!(entry.port, 443);
        assert_eq!(entry.addresses, vec!["192.168.1.100", "192.168.1.101"]);

        let forced = parse_resolve("+example.com:80:[::1]").unwrap();
        assert!(forced.force);
        assert_eq!(forced.addresses, vec!["[::1]"]);
        assert_eq!(forced.to_string(), "+example.com:80:[::1]");
    }

    #[rstest]
    #[case("example.com:192.168.1.100")]
    #[case("example.com:abc:192.168.1.100")]
    #[case("example.com:443:")]
    #[case("example.com:70000:10.0.0.1")]
    fn bad_resolve_entries(#[case] input: &str) {
        assert!(parse_resolve(input).is_err());
    }

    #[test]
    fn connect_to_entries() {
        let entry = parse_connect_to("example.com:443:127.0.0.1:8443").unwrap();
        assert_eq!(entry.source_host.as_deref(), Some("example.com"));
        assert_eq!(entry.source_port, Some(443));
        assert_eq!(entry.target_host, "127.0.0.1");
        assert_eq!(entry.target_port, Some(8443));
        assert!(entry.matches("EXAMPLE.com", 443));
        assert!(!entry.matches("example.com", 80));

        let wildcard = parse_connect_to("::proxy.example.com:8080").unwrap();
        assert_eq!(wildcard.source_host, None);
        assert_eq!(wildcard.source_port, None);
        assert!(wildcard.matches("anything", 1));
        assert_eq!(wildcard.to_string(), "::proxy.example.com:8080");

        let v6 = parse_connect_to("[::1]:80:[fe80::1]:").unwrap();
        assert_eq!(v6.source_host.as_deref(), Some("[::1]"));
        assert_eq!(v6.target_host, "[fe80::1]");
        assert_eq!(v6.target_port, None);
    }

    #[rstest]
    #[case("example.com:443:127.0.0.1")]
    #[case("example.com:abc:127.0.0.1:8443")]
    #[case("example.com:443:127.0.0.1:xyz")]
    #[case("example.com:443::8443")]
    fn bad_connect_to_entries(#[case] input: &str) {
        assert!(parse_connect_to(input).is_err());
    }

    #[test]
    fn counts_reject_negatives() {
        assert_eq!(parse_count("5").unwrap(), 5);
        assert!(parse_count("-1").is_err());
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case(" 1048576 ", Some(1_048_576))]
    #[case("-", None)]
    #[case("12k", None)]
    fn byte_offsets(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_offset(input).ok(), expected);
    }
}
