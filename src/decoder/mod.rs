//! Field decoders: turn an encoded request body into field events.
//!
//! The parser never touches the wire format itself. It asks a
//! [`DecoderFactory`] for a [`FieldDecoder`] built from the request headers
//! and then consumes the decoder's [`DecoderEvent`] stream. The built-in
//! [`FormDecoders`] factory handles `multipart/form-data` (via `multer`) and
//! `application/x-www-form-urlencoded` (via `urlencoding`).

mod charset;
mod multipart;
mod options;
mod urlencoded;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::error::DecoderError;
use crate::utils::{content_type_param, media_type};

pub use charset::Charset;
pub use multipart::MultipartDecoder;
pub use options::{truncate_bytes, truncate_str, truncate_utf8, DecoderOptions, Limits};
pub use urlencoded::UrlencodedDecoder;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single-use request body
pub type ByteStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// Events emitted by a decoder
pub type EventStream = BoxStream<'static, DecoderEvent>;

/// One decoder event. A well-behaved decoder emits any number of `Field`
/// events followed by exactly one `Finish` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    Field { name: String, value: String },
    Finish,
    Error(DecoderError),
}

impl DecoderEvent {
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        DecoderEvent::Field {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A decoder bound to one request
pub trait FieldDecoder: Send {
    /// Consume the body and report its fields.
    fn decode(self: Box<Self>, body: ByteStream) -> EventStream;
}

/// Builds a decoder for a request
pub trait DecoderFactory: Send + Sync + 'static {
    /// Construct a decoder. Fails synchronously when the headers or options
    /// cannot be decoded at all.
    fn build(&self, headers: &HeaderMap, options: &DecoderOptions) -> Result<Box<dyn FieldDecoder>, DecoderError>;
}

/// Default factory choosing a decoder from the request `Content-Type`
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDecoders;

impl DecoderFactory for FormDecoders {
    fn build(&self, headers: &HeaderMap, options: &DecoderOptions) -> Result<Box<dyn FieldDecoder>, DecoderError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DecoderError::Setup("Missing Content-Type".to_string()))?;

        let default_charset = Charset::from_label(&options.def_charset)
            .ok_or_else(|| DecoderError::Setup(format!("Unsupported charset: {}", options.def_charset)))?;

        match media_type(content_type).as_str() {
            "multipart/form-data" => Ok(Box::new(MultipartDecoder::new(
                content_type,
                default_charset,
                options.limits,
            ))),
            "application/x-www-form-urlencoded" => {
                let charset = content_type_param(content_type, "charset")
                    .and_then(|label| Charset::from_label(&label))
                    .unwrap_or(default_charset);
                Ok(Box::new(UrlencodedDecoder::new(charset, options.limits)))
            }
            _ => Err(DecoderError::Setup(format!("Unsupported content type: {}", content_type))),
        }
    }
}

/// Wrap any fallible chunk stream as a [`ByteStream`].
pub fn byte_stream<S, B, E>(stream: S) -> ByteStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: Into<Bytes> + 'static,
    E: Into<BoxError> + 'static,
{
    stream
        .map_ok(Into::<Bytes>::into)
        .map_err(Into::<BoxError>::into)
        .boxed()
}

/// A [`ByteStream`] over an in-memory body.
pub fn bytes_body(body: impl Into<Bytes>) -> ByteStream {
    let body: Bytes = body.into();
    stream::once(async move { Ok::<_, BoxError>(body) }).boxed()
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
    fn test_build_requires_content_type() {
        let err = FormDecoders.build(&HeaderMap::new(), &DecoderOptions::default()).err();
        assert_eq!(err, Some(DecoderError::Setup("Missing Content-Type".into())));
    }

    #[test]
    fn test_build_rejects_other_content_types() {
        let err = FormDecoders.build(&headers("text/plain"), &DecoderOptions::default()).err();
        assert_eq!(err, Some(DecoderError::Setup("Unsupported content type: text/plain".into())));
    }

    #[test]
    fn test_build_rejects_unknown_default_charset() {
        let options = DecoderOptions {
            def_charset: "klingon".into(),
            ..DecoderOptions::default()
        };
        let err = FormDecoders
            .build(&headers("application/x-www-form-urlencoded"), &options)
            .err();
        assert_eq!(err, Some(DecoderError::Setup("Unsupported charset: klingon".into())));
    }

    #[test]
    fn test_build_accepts_both_form_types() {
        let options = DecoderOptions::default();
        assert!(FormDecoders.build(&headers("application/x-www-form-urlencoded"), &options).is_ok());
        assert!(FormDecoders.build(&headers("multipart/form-data; boundary=abc"), &options).is_ok());
        // A missing boundary surfaces while decoding, not here.
        assert!(FormDecoders.build(&headers("multipart/form-data"), &options).is_ok());
    }

    #[tokio::test]
    async fn test_byte_stream_maps_errors() {
        let chunks = stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"a")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "aborted")),
        ]);
        let collected: Vec<_> = byte_stream(chunks).collect().await;
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[1].as_ref().unwrap_err().to_string(), "aborted");
    }

    #[tokio::test]
    async fn test_byte_stream_converts_owned_chunks() {
        let chunks = stream::iter(vec![Ok(b"name=".to_vec()), Ok(b"value".to_vec()), Err(String::from("reset"))]);
        let collected: Vec<_> = byte_stream(chunks).collect().await;
        assert_eq!(collected[0].as_ref().ok(), Some(&Bytes::from_static(b"name=")));
        assert_eq!(collected[1].as_ref().ok(), Some(&Bytes::from_static(b"value")));
        assert_eq!(collected[2].as_ref().unwrap_err().to_string(), "reset");
    }
}
