//! axum integration: content-type gate, body-parsing middleware and the
//! [`FormBody`] extractor.

mod content_type;
mod extract;
mod middleware;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Router;

use crate::config::{EffectiveConfig, FormPluginOptions, HostDefaults};
use crate::decoder::{DecoderFactory, FormDecoders};
use crate::parser::FormParser;

pub use content_type::FormContentType;
pub use extract::{FormBody, MissingFormBody};
pub use middleware::form_body_middleware;

/// A form parser registered for a set of content types.
pub struct FormPlugin<D = FormDecoders> {
    config: EffectiveConfig,
    content_types: Vec<FormContentType>,
    parser: FormParser<D>,
}

impl FormPlugin<FormDecoders> {
    pub fn new(options: FormPluginOptions, host: HostDefaults) -> Self {
        Self::with_decoders(options, host, FormDecoders)
    }
}

impl<D: DecoderFactory> FormPlugin<D> {
    pub fn with_decoders(options: FormPluginOptions, host: HostDefaults, decoders: D) -> Self {
        let config = EffectiveConfig::merge(&host, &options);

        let mut content_types = Vec::new();
        if config.multipart {
            content_types.push(FormContentType::Multipart);
        }
        if config.urlencoded {
            content_types.push(FormContentType::Urlencoded);
        }

        let parser = FormParser::with_decoders(config.parser_config(), decoders);
        tracing::debug!(
            content_types = ?content_types,
            on_constructor_poisoning = %config.policy.on_constructor_poisoning,
            on_proto_poisoning = %config.policy.on_proto_poisoning,
            "form plugin configured"
        );

        Self {
            config,
            content_types,
            parser,
        }
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub fn parser(&self) -> &FormParser<D> {
        &self.parser
    }

    /// Content types routed into the parser, in registration order.
    pub fn content_types(&self) -> &[FormContentType] {
        &self.content_types
    }

    pub fn has_content_type_parser(&self, content_type: FormContentType) -> bool {
        self.content_types.contains(&content_type)
    }

    /// The parser for a request, if its `Content-Type` is enabled.
    pub fn parser_for(&self, headers: &HeaderMap) -> Option<&FormParser<D>> {
        let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let form_type = FormContentType::from_header(content_type)?;
        if self.has_content_type_parser(form_type) {
            Some(&self.parser)
        } else {
            None
        }
    }

    /// Install the parsing middleware on `router`. With every content type
    /// disabled the router is returned untouched.
    pub fn register<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.content_types.is_empty() {
            tracing::debug!("no form content types enabled, skipping registration");
            return router;
        }
        router.layer(axum::middleware::from_fn_with_state(
            Arc::new(self),
            form_body_middleware::<D>,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_default_registers_both() {
        let plugin = FormPlugin::new(FormPluginOptions::default(), HostDefaults::default());
        assert_eq!(
            plugin.content_types(),
            &[FormContentType::Multipart, FormContentType::Urlencoded]
        );
    }

    #[test]
    fn test_parser_for_respects_gate() {
        let plugin = FormPlugin::new(
            FormPluginOptions {
                multipart: Some(false),
                ..FormPluginOptions::default()
            },
            HostDefaults::default(),
        );

        assert!(plugin.parser_for(&headers("application/x-www-form-urlencoded")).is_some());
        assert!(plugin.parser_for(&headers("multipart/form-data; boundary=x")).is_none());
        assert!(plugin.parser_for(&headers("application/json")).is_none());
        assert!(plugin.parser_for(&HeaderMap::new()).is_none());
    }
}
