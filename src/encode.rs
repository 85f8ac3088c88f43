//! Serialize a [`ParsedFormBody`] back into a form encoding.
//!
//! Sequences expand to one pair per value, in order, so decoding the output
//! yields the same body.

use crate::models::ParsedFormBody;
use crate::utils::build_query_string;

/// Flatten a body into `(name, value)` pairs in arrival order.
pub fn to_pairs(body: &ParsedFormBody) -> Vec<(String, String)> {
    body.iter()
        .flat_map(|(name, value)| {
            value
                .values()
                .into_iter()
                .map(move |v| (name.to_string(), v.to_string()))
        })
        .collect()
}

/// `application/x-www-form-urlencoded` rendering.
pub fn encode_urlencoded(body: &ParsedFormBody) -> String {
    build_query_string(&to_pairs(body))
}

/// `multipart/form-data` rendering using `boundary`.
pub fn encode_multipart(body: &ParsedFormBody, boundary: &str) -> String {
    let mut out = String::new();
    for (name, value) in to_pairs(body) {
        out.push_str("--");
        out.push_str(boundary);
        out.push_str("\r\nContent-Disposition: form-data; name=\"");
        out.push_str(&escape_quoted(&name));
        out.push_str("\"\r\n\r\n");
        out.push_str(&value);
        out.push_str("\r\n");
    }
    out.push_str("--");
    out.push_str(boundary);
    out.push_str("--\r\n");
    out
}

/// `Content-Type` header value matching [`encode_multipart`].
pub fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

fn escape_quoted(name: &str) -> String {
    name.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}
