use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::FormPlugin;
use crate::decoder::{byte_stream, DecoderFactory};

/// Parse form bodies for enabled content types and hand the result to the
/// handler through request extensions. Failed parses answer with the error
/// response and never reach the handler.
pub async fn form_body_middleware<D: DecoderFactory>(
    State(plugin): State<Arc<FormPlugin<D>>>,
    request: Request,
    next: Next,
) -> Response {
    let parser = match plugin.parser_for(request.headers()) {
        Some(parser) => parser.clone(),
        None => return next.run(request).await,
    };

    let (mut parts, body) = request.into_parts();
    let stream = byte_stream(body.into_data_stream());

    match parser.parse(stream, &parts.headers).await {
        Ok(form) => {
            parts.extensions.insert(form);
            next.run(Request::from_parts(parts, Body::empty())).await
        }
        Err(e) => {
            tracing::warn!(error = %e, method = %parts.method, uri = %parts.uri, "form body parsing failed");
            e.into_response()
        }
    }
}
