//! Response header capture

use reqwest::header::HeaderMap;
use triager_common::HeaderEntry;

/// Capture every header of a response, grouping repeated names.
///
/// Entries keep the order in which names first appeared on the wire.
pub fn collect_headers(headers: &HeaderMap) -> Vec<HeaderEntry> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            HeaderEntry::new(canonical_header_name(name.as_str()), values)
        })
        .collect()
}

/// `content-type` -> `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut s = first.to_ascii_uppercase().to_string();
                    s.push_str(&chars.as_str().to_ascii_lowercase());
                    s
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
