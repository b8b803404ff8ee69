use std::thread;

use curlreq::body::{Body, BodyKind, FORM_URLENCODED, Payload};
use curlreq::curl::ContinueAt;
use curlreq::{AuthType, Dialect, Error, MemoryReader, Parser, Registry, parse, tokenize};
use rstest::rstest;

fn parser() -> Parser<'static> {
    Parser::default().with_reader(
        MemoryReader::new()
            .with_file("file.txt", "hello from a file\n")
            .with_file("cookies.txt", "a=1; b=2\n"),
    )
}

fn body_text(body: Option<&Body>) -> String {
    body.map(|body| String::from_utf8_lossy(&body.to_bytes().unwrap()).into_owned())
        .unwrap_or_default()
}

#[test]
fn repeated_data_joins_with_ampersand() {
    let curl = parser()
        .parse(r#"curl -X POST -d "a=1" -d "b=2" http://x/y"#)
        .unwrap();
    assert_eq!(curl.method, "POST");
    assert_eq!(body_text(curl.body.as_ref()), "a=1&b=2");
    assert_eq!(curl.header("Content-Type"), Some(FORM_URLENCODED));
    assert_eq!(curl.effective_content_type().as_deref(), Some(FORM_URLENCODED));
}

#[test]
fn cookie_header_is_parsed() {
    let curl = parser().parse("curl -H 'Cookie: a=1; b=2' http://x").unwrap();
    let cookies: Vec<_> = curl
        .cookies
        .iter()
        .map(|c| (c.name.as_str(), c.value.as_str()))
        .collect();
    assert_eq!(cookies, vec![("a", "1"), ("b", "2")]);
    assert_eq!(curl.header("Cookie"), Some("a=1; b=2"));
    assert_eq!(curl.cookie_jar.cookies("x").len(), 2);
}

#[test]
fn digest_credentials() {
    let curl = parser().parse("curl --digest user:pass http://x").unwrap();
    let auth = curl.auth.unwrap();
    assert_eq!(auth.kind, AuthType::Digest);
    assert_eq!(auth.username, "user");
    assert_eq!(auth.password, "pass");
}

#[test]
fn form_file_field() {
    let curl = parser().parse(r#"curl -F "f=@file.txt" http://x"#).unwrap();
    let body = curl.body.as_ref().unwrap();
    assert_eq!(body.kind(), BodyKind::Multipart);
    assert_eq!(body.kind().as_str(), "multipart");

    let fields = body.as_multipart().unwrap().fields();
    assert_eq!(fields.len(), 1);
    assert!(fields[0].is_file);
    assert_eq!(fields[0].filename.as_deref(), Some("file.txt"));
}

#[test]
fn get_mode_moves_data() {
    let curl = parser().parse(r#"curl -G -d "q=v" http://x/y"#).unwrap();
    assert_eq!(curl.method, "GET");
    assert!(curl.get_mode);
    assert_eq!(curl.query_data.as_deref(), Some("q=v"));
    assert_eq!(curl.url.as_str(), "http://x/y?q=v");
    assert!(curl.body.is_none());
    assert!(curl.header("Content-Type").is_none());
}

#[rstest]
#[case("curl -d 'a=1' -G http://x", "GET")]
#[case("curl -G -X POST -d 'a=1' http://x", "POST")]
#[case("curl -X DELETE -G -d 'a=1' http://x", "GET")]
#[case("curl -I http://x", "HEAD")]
#[case("curl -d '' http://x", "POST")]
#[case("curl -x http://p:1 http://x", "GET")]
fn method_resolution(#[case] input: &str, #[case] method: &str) {
    assert_eq!(parser().parse(input).unwrap().method, method);
}

#[test]
fn get_mode_keeps_explicit_content_type_and_existing_query() {
    let curl = parser()
        .parse("curl -G -H 'Content-Type: text/plain' --data-urlencode 'q=a b' 'http://x/s?lang=en'")
        .unwrap();
    assert_eq!(curl.url.as_str(), "http://x/s?lang=en&q=a+b");
    assert_eq!(curl.header("Content-Type"), Some("text/plain"));
}

#[test]
fn binary_data_concatenates() {
    let curl = parser()
        .parse("curl --data-binary 'a=1' --data-binary @file.txt http://x")
        .unwrap();
    assert_eq!(body_text(curl.body.as_ref()), "a=1hello from a file\n");
}

#[test]
fn json_body() {
    let curl = parser().parse(r#"curl --json '{"k": [1, 2]}' http://x"#).unwrap();
    assert!(matches!(curl.body, Some(Body::Json(_))));
    assert_eq!(body_text(curl.body.as_ref()), r#"{"k": [1, 2]}"#);
    assert_eq!(curl.header("Accept"), Some("application/json"));
    assert_eq!(curl.method, "POST");

    let broken = parser().parse("curl --json '{oops' http://x").unwrap();
    let raw = broken.body.as_ref().and_then(Body::as_raw).unwrap();
    assert_eq!(raw.content_type(), "application/json");
    assert_eq!(raw.text(), "{oops");
}

#[test]
fn json_is_sent_as_typed() {
    let text = r#"{"b":1,"a":2,"n":1.10,"big":123456789012345678901234567890}"#;
    let curl = parser().parse(&format!("curl --json '{text}' http://x")).unwrap();
    assert!(matches!(curl.body, Some(Body::Json(_))));
    assert_eq!(body_text(curl.body.as_ref()), text);
}

#[rstest]
#[case("curl --json '{}' -H 'Accept: text/plain' http://x", vec!["text/plain"])]
#[case("curl -H 'Accept: text/plain' --json '{}' http://x", vec!["text/plain"])]
#[case("curl --json '{}' -H 'Accept: a/b' -H 'Accept: c/d' http://x", vec!["a/b", "c/d"])]
#[case("curl --json '{}' http://x", vec!["application/json"])]
fn explicit_accept_wins_over_json(#[case] input: &str, #[case] expected: Vec<&str>) {
    let curl = parser().parse(input).unwrap();
    assert_eq!(curl.headers.get_all("accept").collect::<Vec<_>>(), expected);
}

#[test]
fn explicit_multipart_header_carries_the_boundary() {
    let curl = parser()
        .parse("curl -H 'Content-Type: multipart/form-data' -F a=1 -F f=@file.txt http://x")
        .unwrap();
    let body_type = curl.body.as_ref().unwrap().content_type().into_owned();
    assert!(body_type.contains("; boundary=curlreq-"));
    assert_eq!(curl.header("Content-Type"), Some(body_type.as_str()));
    assert_eq!(curl.headers.get_all("content-type").count(), 1);
}

#[test]
fn get_mode_keeps_data_as_written() {
    let curl = parser().parse("curl -G -d flag -d 'e=a@b' http://x/y").unwrap();
    assert_eq!(curl.url.as_str(), "http://x/y?flag&e=a@b");
    assert_eq!(curl.query_data.as_deref(), Some("flag&e=a@b"));
}

#[test]
fn cookie_option_is_passed_through() {
    let curl = parser().parse(r#"curl -b 'flag; a="q"' http://x"#).unwrap();
    assert_eq!(curl.header("Cookie"), Some(r#"flag; a="q""#));
}

#[test]
fn raw_body_takes_explicit_content_type() {
    let curl = parser()
        .parse(r#"curl --data-raw '{"a":1}' -H 'Content-Type: application/json' http://x"#)
        .unwrap();
    let body = curl.body.as_ref().unwrap();
    assert_eq!(body.content_type(), "application/json");
    assert_eq!(curl.headers.get_all("content-type").count(), 1);
}

#[test]
fn cookie_file() {
    let curl = parser().parse("curl -b @cookies.txt -b c=3 http://x/a/b").unwrap();
    assert_eq!(curl.header("Cookie"), Some("a=1; b=2; c=3"));
    assert_eq!(curl.cookies.len(), 3);
    let stored = curl.cookie_jar.cookies("x");
    assert_eq!(stored[2].path.as_deref(), Some("/a"));
}

#[test]
fn transfer_config() {
    let curl = parser()
        .parse(
            "curl -L --max-time 1m30s --connect-timeout 2.5 -x socks5://p:1080 -U u:p \
             --limit-rate 100K --resolve a.test:443:10.0.0.1 --connect-to a.test:443:b.test:8443 \
             -o out.bin --output-dir dl -C - --http2 -f -v -w '%{http_code}' https://a.test/",
        )
        .unwrap();
    let config = &curl.config;
    assert!(config.follow_redirects);
    assert_eq!(config.max_redirs, Some(30));
    assert_eq!(config.timeout, Some(std::time::Duration::from_secs(90)));
    assert_eq!(config.connect_timeout, Some(std::time::Duration::from_millis(2500)));
    assert_eq!(config.proxy.as_deref(), Some("socks5://p:1080"));
    assert_eq!(config.proxy_user.as_deref(), Some("u"));
    assert_eq!(config.limit_rate, Some(100 * 1024));
    assert_eq!(config.resolve.len(), 1);
    assert_eq!(config.connect_to[0].target_host, "b.test");
    assert_eq!(config.output.continue_at, Some(ContinueAt::Auto));
    assert_eq!(
        config.output.target_path(&curl.url),
        Some(std::path::PathBuf::from("dl/out.bin"))
    );
    assert_eq!(config.http_version, curlreq::curl::HttpVersion::Http2);
    assert!(config.fail_on_error && config.verbose);
    assert_eq!(config.write_out.as_deref(), Some("%{http_code}"));
}

#[test]
fn unknown_flag_is_named() {
    let err = parse("curl --frobnicate http://x").unwrap_err();
    assert!(err.to_string().contains("--frobnicate"));
}

#[test]
fn handler_error_aborts_the_parse() {
    let err = parser().parse("curl -d @missing.txt http://x").unwrap_err();
    assert!(matches!(&err, Error::Option { flag, .. } if flag == "-d"));
    assert!(matches!(err.root(), Error::FileRead { .. }));
}

#[test]
fn windows_cmd_command() {
    let input = "curl ^\"https://example.com/api?a=1^&b=2^\" ^\n  -H ^\"accept: application/json^\" ^\n  --data-raw ^\"^{^\\^\"k^\\^\":1^}^\"";
    let curl = parser().parse(input).unwrap();
    assert_eq!(curl.url.as_str(), "https://example.com/api?a=1&b=2");
    assert_eq!(body_text(curl.body.as_ref()), r#"{"k":1}"#);

    let forced = parser().with_dialect(Dialect::Cmd).parse(input).unwrap();
    assert_eq!(forced, curl);
}

#[test]
fn browser_bash_command() {
    let input = r#"curl 'https://example.com/graphql' \
  -H 'accept: */*' \
  -H $'x-note: line1\nline2' \
  -b 'sid=1' \
  --data-raw $'{"q":"it\'s"}' \
  --compressed"#;
    let curl = parser().parse(input).unwrap();
    assert_eq!(curl.header("x-note"), Some("line1\nline2"));
    assert_eq!(body_text(curl.body.as_ref()), r#"{"q":"it's"}"#);
    assert_eq!(curl.header("Cookie"), Some("sid=1"));
}

#[test]
fn parsing_is_deterministic_apart_from_boundaries() {
    let input = "curl -H 'A: 1' -d 'x=1' --resolve h:80:1.2.3.4 http://h/";
    assert_eq!(parser().parse(input).unwrap(), parser().parse(input).unwrap());

    let form = "curl -F a=1 http://h/";
    let a = parser().parse(form).unwrap();
    let b = parser().parse(form).unwrap();
    let boundary = |curl: &curlreq::Curl| {
        curl.body
            .as_ref()
            .and_then(Body::as_multipart)
            .map(|m| m.boundary().to_owned())
    };
    assert_ne!(boundary(&a), boundary(&b));
}

#[test]
fn concurrent_parses_share_the_registry() {
    let registry = Registry::standard();
    let parser = Parser::new(&registry).with_reader(MemoryReader::new());

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let parser = &parser;
                scope.spawn(move || {
                    parser
                        .parse(&format!("curl -d 'n={n}' http://x/{n}"))
                        .unwrap()
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let curl = handle.join().unwrap();
            assert_eq!(curl.url.path(), format!("/{n}"));
            assert_eq!(body_text(curl.body.as_ref()), format!("n={n}"));
        }
    });
}

#[test]
fn cookie_file_from_disk() {
    let path = std::env::temp_dir().join(format!("curlreq-cookies-{}.txt", std::process::id()));
    std::fs::write(
        &path,
        "# Netscape HTTP Cookie File\n.x.test\tTRUE\t/\tFALSE\t0\tsid\tabc\n",
    )
    .unwrap();

    let input = format!("curl -b @{} http://x.test/", path.display());
    let curl = parse(&input).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(curl.header("Cookie"), Some("sid=abc"));
    assert_eq!(curl.cookies[0].domain.as_deref(), Some(".x.test"));
}

#[test]
fn tokens_keep_empty_quoted_arguments() {
    let tokens = tokenize("curl -d '' http://x \"\"").unwrap();
    let texts: Vec<_> = tokens.iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["curl", "-d", "", "http://x", ""]);
}
