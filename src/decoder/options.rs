use serde::{Deserialize, Serialize};

pub const DEFAULT_CHARSET: &str = "utf-8";
pub const DEFAULT_FIELD_NAME_SIZE: usize = 100;
pub const DEFAULT_FIELD_SIZE: usize = 1024 * 1024;

/// Raw decoder settings. Request headers are never part of these; they are
/// always taken from the live request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecoderOptions {
    /// Charset used when a request or part does not name one
    pub def_charset: String,
    pub limits: Limits,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            def_charset: DEFAULT_CHARSET.to_string(),
            limits: Limits::default(),
        }
    }
}

/// Size and count limits. Oversized names and values are truncated, fields
/// and parts past their count limit are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    /// Max field name size in bytes
    pub field_name_size: usize,
    /// Max field value size in bytes
    pub field_size: usize,
    /// Max number of non-file fields
    pub fields: Option<usize>,
    /// Max number of parts (fields and files) in a multipart body
    pub parts: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            field_name_size: DEFAULT_FIELD_NAME_SIZE,
            field_size: DEFAULT_FIELD_SIZE,
            fields: None,
            parts: None,
        }
    }
}

impl Limits {
    /// Can another field be admitted after `seen` fields?
    pub fn admits_field(&self, seen: usize) -> bool {
        self.fields.map_or(true, |max| seen < max)
    }

    pub fn admits_part(&self, seen: usize) -> bool {
        self.parts.map_or(true, |max| seen < max)
    }
}

/// Cut `bytes` down to at most `max` bytes.
pub fn truncate_bytes(bytes: &mut Vec<u8>, max: usize) -> bool {
    if bytes.len() > max {
        bytes.truncate(max);
        true
    } else {
        false
    }
}

/// Cut UTF-8 `bytes` to at most `max` bytes without splitting a character.
pub fn truncate_utf8(bytes: &mut Vec<u8>, max: usize) -> bool {
    if bytes.len() <= max {
        return false;
    }
    let mut end = max;
    while end > 0 && bytes[end] & 0b1100_0000 == 0b1000_0000 {
        end -= 1;
    }
    bytes.truncate(end);
    true
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
