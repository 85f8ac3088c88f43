use std::borrow::Cow;

/// Percent-decode one urlencoded component, turning `+` into a space.
///
/// Malformed escapes are kept verbatim instead of failing.
pub fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Cow<[u8]> = if raw.contains(&b'+') {
        Cow::Owned(raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect())
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode_binary(&spaced).into_owned()
}
