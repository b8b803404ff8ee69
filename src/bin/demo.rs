use curlreq::parse;

fn main() {
    let curl_command = r#"curl 'https://api.example.com/v1/users?page=2' \
  -H 'Accept: application/json' \
  -H 'Cookie: session=abc123; theme=dark' \
  -u 'alice:s3cret' \
  --data-raw '{"name":"Bob"}' \
  -H 'Content-Type: application/json' \
  --compressed -L"#;

    match parse(curl_command) {
        Ok(curl) => {
            println!("{curl}");
            print!("{}", curl.verbose_info());
        }
        Err(e) => eprintln!("{e}"),
    }
}
