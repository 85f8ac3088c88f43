use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::models::ParsedFormBody;

/// Extractor for the body parsed by [`form_body_middleware`](super::form_body_middleware).
#[derive(Debug, Clone)]
pub struct FormBody(pub ParsedFormBody);

/// Rejection when the request carried no parsed form body.
#[derive(Debug, Clone, Copy)]
pub struct MissingFormBody;

impl IntoResponse for MissingFormBody {
    fn into_response(self) -> Response {
        let status = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": "Request body is not a parsed form",
        });
        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = MissingFormBody;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<ParsedFormBody>()
            .map(FormBody)
            .ok_or(MissingFormBody)
    }
}
