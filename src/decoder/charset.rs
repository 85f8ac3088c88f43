use super::options::{truncate_bytes, truncate_utf8};

/// Text encodings the built-in decoders understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Latin1,
}

impl Charset {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "us-ascii" | "ascii" => Some(Charset::Utf8),
            "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Some(Charset::Latin1),
            _ => None,
        }
    }

    /// Decode raw bytes. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    /// Cut encoded `bytes` to at most `max` bytes, keeping whole characters.
    pub fn truncate(&self, bytes: &mut Vec<u8>, max: usize) -> bool {
        match self {
            Charset::Utf8 => truncate_utf8(bytes, max),
            Charset::Latin1 => truncate_bytes(bytes, max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Charset::from_label("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label("ISO-8859-1"), Some(Charset::Latin1));
        assert_eq!(Charset::from_label("shift_jis"), None);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(Charset::Latin1.decode(&[0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(Charset::Utf8.decode("café".as_bytes()), "café");
    }
}
