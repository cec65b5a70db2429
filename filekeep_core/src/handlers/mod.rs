pub mod demo;
pub mod history;
pub mod routes;
pub mod upload;
pub mod widget;

use axum::http::HeaderValue;
use axum::response::Redirect;

/// Redirects back to the caller-supplied destination. Only absolute paths
/// on this host that survive as a Location header value are honored;
/// anything else falls back to the demo page. Query decoding means the
/// destination can carry raw control bytes, which `Redirect::to` would
/// otherwise panic on.
pub(crate) fn return_to(destination: Option<&str>) -> Redirect {
    match destination {
        Some(dest)
            if dest.starts_with('/')
                && !dest.starts_with("//")
                && HeaderValue::from_str(dest).is_ok() =>
        {
            Redirect::to(dest)
        }
        _ => Redirect::to("/demo"),
    }
}

/// Percent-encodes a string for use as a query parameter value.
pub(crate) fn urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
