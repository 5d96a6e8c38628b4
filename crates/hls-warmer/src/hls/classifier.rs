// Cache classifier: infers whether a response was served by an intermediary cache.

use reqwest::header::{AGE, HeaderMap, HeaderValue};

/// Vendor headers that carry a textual cache verdict.
const CACHE_STATUS_HEADERS: &[&str] = &[
    "x-cache",
    "x-cache-status",
    "x-served-by",
    "cf-cache-status", // Cloudflare
    "x-fastly-cache",  // Fastly
    "x-varnish-cache", // Varnish
];

const HIT_TOKENS: &[&str] = &["hit", "cached"];

/// Returns `true` when the response headers indicate a cache hit.
///
/// CDNs encode cache state inconsistently, so this is a heuristic: any of the
/// vendor headers containing `hit`/`cached` (case-insensitive), or an `Age`
/// header other than `0`, counts as a hit. Anything else is a miss.
pub fn is_cache_hit(headers: &HeaderMap) -> bool {
    let vendor_hit = CACHE_STATUS_HEADERS.iter().any(|name| {
        headers.get(*name).is_some_and(|value| {
            let value = header_text(value).to_ascii_lowercase();
            HIT_TOKENS.iter().any(|token| value.contains(token))
        })
    });

    let aged = headers
        .get(AGE)
        .is_some_and(|age| !age.is_empty() && age.as_bytes() != b"0");

    vendor_hit || aged
}

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
