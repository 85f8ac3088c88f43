//! Form body parsing for axum.
//!
//! Decodes `multipart/form-data` and `application/x-www-form-urlencoded`
//! request bodies into a flat [`ParsedFormBody`], merging repeated field
//! names into ordered sequences and applying a configurable defense against
//! field names that shadow inherited prototype properties
//! (`constructor`, `toString`, `__proto__`, ...).
//!
//! ```no_run
//! use axum::{routing::post, Json, Router};
//! use formbody::config::{FormPluginOptions, HostDefaults};
//! use formbody::plugin::{FormBody, FormPlugin};
//! use formbody::ParsedFormBody;
//!
//! async fn echo(FormBody(body): FormBody) -> Json<ParsedFormBody> {
//!     Json(body)
//! }
//!
//! let plugin = FormPlugin::new(FormPluginOptions::default(), HostDefaults::from_env());
//! let app: Router = plugin.register(Router::new().route("/", post(echo)));
//! ```

pub mod accumulator;
pub mod config;
pub mod decoder;
pub mod encode;
pub mod error;
pub mod models;
pub mod parser;
pub mod plugin;
pub mod utils;

pub use accumulator::attach;
pub use error::{ConfigError, DecoderError, FormError, PoisoningViolation};
pub use models::{FieldValue, ParsedFormBody, PoisoningAction, PoisoningPolicy};
pub use parser::FormParser;
pub use plugin::{FormBody, FormContentType, FormPlugin};
