use std::fmt;

use crate::utils::media_type;

/// Content types the form parser can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormContentType {
    Multipart,
    Urlencoded,
}

impl FormContentType {
    pub const ALL: [FormContentType; 2] = [FormContentType::Multipart, FormContentType::Urlencoded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multipart => "multipart/form-data",
            Self::Urlencoded => "application/x-www-form-urlencoded",
        }
    }

    /// Match a raw `Content-Type` header value against this type.
    pub fn matches(&self, content_type: &str) -> bool {
        media_type(content_type) == self.as_str()
    }

    pub fn from_header(content_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| ct.matches(content_type))
    }
}

impl fmt::Display for FormContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
