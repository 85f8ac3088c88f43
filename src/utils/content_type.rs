/// Lowercased media type of a `Content-Type` value, parameters stripped
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Value of a `Content-Type` parameter (case-insensitive name, quotes removed)
pub fn content_type_param(content_type: &str, name: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strips_params() {
        assert_eq!(media_type("Multipart/Form-Data; boundary=xyz"), "multipart/form-data");
        assert_eq!(media_type("application/x-www-form-urlencoded"), "application/x-www-form-urlencoded");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_content_type_param() {
        let ct = "application/x-www-form-urlencoded; Charset=\"ISO-8859-1\"";
        assert_eq!(content_type_param(ct, "charset").as_deref(), Some("ISO-8859-1"));
        assert_eq!(content_type_param(ct, "boundary"), None);
    }
}
