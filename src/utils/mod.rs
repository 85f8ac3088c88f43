// Form encoding utilities
pub mod url_encoding;
pub mod query_string;
pub mod content_type;

// Parsing utilities
pub mod parse_flag;

// Re-export all utilities for convenient access
pub use url_encoding::decode_component;
pub use query_string::build_query_string;
pub use content_type::{content_type_param, media_type};
pub use parse_flag::parse_flag;
