use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

const TYPES: &[(&str, &str)] = &[
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("css", "text/css; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("htm", "text/html; charset=utf-8"),
    ("html", "text/html; charset=utf-8"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("md", "text/markdown; charset=utf-8"),
    ("mjs", "text/javascript; charset=utf-8"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("txt", "text/plain; charset=utf-8"),
    ("wasm", "application/wasm"),
    ("webp", "image/webp"),
    ("xml", "text/xml; charset=utf-8"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("zip", "application/zip"),
];

/// MIME type for a file extension, case-insensitively.
pub fn by_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// MIME type for an upload path, falling back to `application/octet-stream`.
pub fn from_path(path: &str) -> &'static str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(by_extension)
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("photo.JPG", "image/jpeg")]
    #[case("/tmp/data.json", "application/json")]
    #[case("notes.txt", "text/plain; charset=utf-8")]
    #[case("archive.unknown", OCTET_STREAM)]
    #[case("no_extension", OCTET_STREAM)]
    fn guesses_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(from_path(path), expected);
    }

    #[test]
    fn accepts_leading_dot() {
        assert_eq!(by_extension(".png"), Some("image/png"));
        assert_eq!(by_extension("exe"), None);
    }
}
