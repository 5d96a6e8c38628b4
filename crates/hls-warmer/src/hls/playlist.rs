// Playlist parser: turns a playlist body into the absolute URLs worth warming.

use url::Url;

use crate::utils::sanitize;

/// Lines shorter than this after cleaning are treated as garbage.
const MIN_SEGMENT_LINE_LEN: usize = 5;

/// Control bytes that must never reach the network layer.
const FORBIDDEN_CONTROL_BYTES: &[char] = &[
    '\x00', '\x01', '\x02', '\x03', '\x04', '\x05', '\x06', '\x07', '\x08', '\x0b', '\x0c',
    '\x0e', '\x0f',
];

/// Substrings that identify a segment URL without a file extension.
const SEGMENT_MARKERS: &[&str] = &["seg", "chunk"];

/// Extracts segment and sub-playlist URLs from a playlist body, in line order.
///
/// Malformed lines are skipped rather than reported; the function never fails.
/// Relative references are resolved against `playlist_url`, absolute http(s)
/// references are kept verbatim.
pub fn parse_segments(body: &str, playlist_url: &Url) -> Vec<String> {
    body.lines()
        .filter_map(|line| resolve_line(line, playlist_url))
        .collect()
}

fn resolve_line(line: &str, base: &Url) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let cleaned = sanitize(line);
    if cleaned.is_empty()
        || cleaned.len() < MIN_SEGMENT_LINE_LEN
        || cleaned.contains(FORBIDDEN_CONTROL_BYTES)
    {
        return None;
    }

    let resolved = resolve_reference(base, &cleaned)?;

    if !resolved.contains('.') && !SEGMENT_MARKERS.iter().any(|m| resolved.contains(m)) {
        return None;
    }

    Some(resolved)
}

fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Url::parse(reference).ok().map(|_| reference.to_owned());
    }
    base.join(reference).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use m3u8_rs::{Playlist, parse_playlist_res};
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse("https://cdn.example/live/index.m3u8").unwrap()
    }

    #[test]
    fn resolves_relative_segments_in_order() {
        let body = "#EXTM3U\nseg001.ts\nseg002.ts\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec![
                "https://cdn.example/live/seg001.ts",
                "https://cdn.example/live/seg002.ts",
            ]
        );
    }

    #[test]
    fn keeps_absolute_urls_verbatim() {
        let body = "#EXTM3U\n#EXTINF:2.0,\nhttps://edge.example/a/seg9.ts?token=abc\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec!["https://edge.example/a/seg9.ts?token=abc"]
        );
    }

    #[test]
    fn resolves_parent_and_root_relative_references() {
        let body = "../vod/part1.ts\n/static/part2.ts\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec![
                "https://cdn.example/vod/part1.ts",
                "https://cdn.example/static/part2.ts",
            ]
        );
    }

    #[test]
    fn skips_blank_comment_and_short_lines() {
        let body = "\n   \n#EXT-X-TARGETDURATION:2\n  # indented comment\na.ts\nabcd\nseg01.ts\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec!["https://cdn.example/live/seg01.ts"]
        );
    }

    #[test]
    fn strips_control_characters_before_resolving() {
        let body = "seg\u{1}003\u{7f}.ts\r\n\u{0}\u{2}\u{3}\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec!["https://cdn.example/live/seg003.ts"]
        );
    }

    #[test]
    fn non_ascii_only_lines_are_dropped() {
        let body = "\u{65e5}\u{672c}\u{8a9e}\u{30c6}\u{30ad}\u{30b9}\u{30c8}\n";
        assert!(parse_segments(body, &base()).is_empty());
    }

    #[test]
    fn requires_dot_or_segment_marker() {
        let base = Url::parse("http://localhost/live/index").unwrap();
        let body = "directive\nsegment42\nchunk-0007\nvideo.m4s\n";
        assert_eq!(
            parse_segments(body, &base),
            vec![
                "http://localhost/live/segment42",
                "http://localhost/live/chunk-0007",
                "http://localhost/live/video.m4s",
            ]
        );
    }

    #[test]
    fn master_playlist_variants_are_returned() {
        let body = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1280000\nlow/index.m3u8\n#EXT-X-STREAM-INF:BANDWIDTH=2560000\nhigh/index.m3u8\n";
        assert_eq!(
            parse_segments(body, &base()),
            vec![
                "https://cdn.example/live/low/index.m3u8",
                "https://cdn.example/live/high/index.m3u8",
            ]
        );
    }

    #[test]
    fn matches_m3u8_rs_for_well_formed_media_playlist() {
        let body = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:4\n#EXT-X-MEDIA-SEQUENCE:120\n#EXTINF:4.0,\nstream_120.ts\n#EXTINF:4.0,\nstream_121.ts\n#EXTINF:3.5,\nhttps://backup.example/stream_122.ts\n";

        let playlist = match parse_playlist_res(body.as_bytes()).expect("playlist should parse") {
            Playlist::MediaPlaylist(pl) => pl,
            Playlist::MasterPlaylist(_) => panic!("expected media playlist"),
        };
        let expected: Vec<String> = playlist
            .segments
            .iter()
            .map(|s| {
                if s.uri.starts_with("https://") {
                    s.uri.clone()
                } else {
                    base().join(&s.uri).unwrap().to_string()
                }
            })
            .collect();

        assert_eq!(parse_segments(body, &base()), expected);
    }

    fn playlist_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z0-9_./-]{0,16}",
            "#[A-Z-]{1,12}(:[0-9.]{1,6})?",
            "https://edge\\.example/[a-z]{1,8}\\.ts",
            "[ \t]{0,3}seg[0-9]{1,4}\\.(ts|m4s)[ \t]{0,3}",
            "[\\x00-\\x1f]{1,4}[a-z]{0,6}",
        ]
    }

    proptest! {
        /// Output never exceeds the number of non-blank, non-comment lines.
        #[test]
        fn output_bounded_by_candidate_lines(lines in prop::collection::vec(playlist_line(), 0..40)) {
            let body = lines.join("\n");
            let candidates = body
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .count();
            prop_assert!(parse_segments(&body, &base()).len() <= candidates);
        }

        /// Every emitted URL is a literal absolute line or the resolution of a cleaned line.
        #[test]
        fn output_is_literal_or_resolved(lines in prop::collection::vec(playlist_line(), 0..40)) {
            let body = lines.join("\n");
            let cleaned: Vec<String> = body.lines().map(|l| sanitize(l.trim())).collect();
            for url in parse_segments(&body, &base()) {
                let explained = cleaned.iter().any(|line| {
                    *line == url || base().join(line).is_ok_and(|u| u.as_str() == url)
                });
                prop_assert!(explained, "unexplained URL {}", url);
                prop_assert!(Url::parse(&url).is_ok());
            }
        }
    }
}
