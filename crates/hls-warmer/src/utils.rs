//! String and URL helpers shared by the parser and the reporting paths.

use url::Url;

/// Strips everything outside printable ASCII, keeping tab, newline and carriage return.
///
/// Error causes can embed arbitrary bytes from remote responses, so every string that
/// reaches a terminal goes through here first.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| matches!(c, ' '..='~' | '\t' | '\n' | '\r'))
        .collect()
}

/// Returns `scheme://host[:port]` of a URL, or `None` when it has no host.
pub fn base_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_printable_ascii_and_whitespace() {
        assert_eq!(sanitize("seg\u{0}01\u{7}.ts"), "seg01.ts");
        assert_eq!(sanitize("a\tb\r\nc"), "a\tb\r\nc");
        assert_eq!(sanitize("caf\u{e9} \u{1b}[31mred"), "caf [31mred");
    }

    #[test]
    fn base_url_keeps_explicit_port() {
        let url = Url::parse("https://cdn.example:8443/live/index.m3u8?token=1").unwrap();
        assert_eq!(base_url(&url).as_deref(), Some("https://cdn.example:8443"));
    }

    #[test]
    fn base_url_drops_path_and_default_port() {
        let url = Url::parse("http://cdn.example:80/a/b.m3u8").unwrap();
        assert_eq!(base_url(&url).as_deref(), Some("http://cdn.example"));
    }

    #[test]
    fn base_url_requires_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert_eq!(base_url(&url), None);
    }
}
