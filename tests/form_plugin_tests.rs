use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode},
    routing::post,
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};
use tower::ServiceExt;

use formbody::config::{FormPluginOptions, HostDefaults};
use formbody::decoder::{ByteStream, DecoderEvent, DecoderFactory, DecoderOptions, EventStream, FieldDecoder};
use formbody::encode::{encode_multipart, encode_urlencoded, multipart_content_type};
use formbody::{
    DecoderError, FieldValue, FormBody, FormContentType, FormPlugin, ParsedFormBody, PoisoningAction,
};

const URLENCODED: &str = "application/x-www-form-urlencoded";
const BOUNDARY: &str = "----formbody-test-boundary";

async fn echo(FormBody(body): FormBody) -> Json<ParsedFormBody> {
    Json(body)
}

fn routes() -> Router {
    Router::new().route("/", post(echo))
}

fn app(options: FormPluginOptions) -> Router {
    FormPlugin::new(options, HostDefaults::default()).register(routes())
}

fn request_a() -> ParsedFormBody {
    vec![
        ("client_id", "e52b2864-7611-4f26-94e4-d13f7039f25d"),
        ("client_secret", "rGGb45-awp0Q9X2yP3CxwhP8HhUY8uW1"),
        ("refresh_token", "f5e6ca6e-e2cf-4130-9b3f-26727ca11f78"),
        ("grant_type", "refresh_token"),
    ]
    .into_iter()
    .collect()
}

fn request_c() -> ParsedFormBody {
    vec![
        ("property", "value"),
        ("constructor", "() => ({})"),
        ("toString", "() => eval(2 + 2)"),
    ]
    .into_iter()
    .collect()
}

fn multipart_type() -> String {
    multipart_content_type(BOUNDARY)
}

async fn send(app: Router, content_type: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn to_json(body: &ParsedFormBody) -> Value {
    serde_json::to_value(body).unwrap()
}

#[tokio::test]
async fn test_urlencoded_fields_attached_to_body() {
    let options = FormPluginOptions { multipart: Some(false), ..Default::default() };
    let (status, json) = send(app(options), URLENCODED, encode_urlencoded(&request_a())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, to_json(&request_a()));
}

#[tokio::test]
async fn test_urlencoded_duplicate_fields_as_array() {
    let options = FormPluginOptions { multipart: Some(false), ..Default::default() };
    let body = "property=valueA&property=valueB&property=valueC".to_string();
    let (status, json) = send(app(options), URLENCODED, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "property": ["valueA", "valueB", "valueC"] }));
}

#[tokio::test]
async fn test_multipart_fields_attached_to_body() {
    let options = FormPluginOptions { urlencoded: Some(false), ..Default::default() };
    let body = encode_multipart(&request_a(), BOUNDARY);
    let (status, json) = send(app(options), &multipart_type(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, to_json(&request_a()));
}

#[tokio::test]
async fn test_prototype_names_attached_by_default() {
    let (status, json) = send(app(FormPluginOptions::default()), URLENCODED, encode_urlencoded(&request_c())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, to_json(&request_c()));
}

#[tokio::test]
async fn test_prototype_names_removed() {
    let options = FormPluginOptions {
        on_constructor_poisoning: Some(PoisoningAction::Remove),
        on_proto_poisoning: Some(PoisoningAction::Remove),
        ..Default::default()
    };

    let (status, json) = send(app(options.clone()), URLENCODED, encode_urlencoded(&request_c())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "property": "value" }));

    let body = encode_multipart(&request_c(), BOUNDARY);
    let (status, json) = send(app(options), &multipart_type(), body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "property": "value" }));
}

#[tokio::test]
async fn test_constructor_error_policy_rejects_request() {
    let options = FormPluginOptions {
        on_constructor_poisoning: Some(PoisoningAction::Error),
        ..Default::default()
    };
    let (status, json) = send(app(options), URLENCODED, encode_urlencoded(&request_c())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Object contains forbidden prototype property");
    assert_eq!(json["statusCode"], 400);
}

#[tokio::test]
async fn test_host_defaults_inherited_and_overridden() {
    let host = HostDefaults {
        on_constructor_poisoning: None,
        on_proto_poisoning: Some(PoisoningAction::Error),
    };
    let body = "property=value&toString=x".to_string();

    let strict = FormPlugin::new(FormPluginOptions::default(), host).register(routes());
    let (status, _) = send(strict, URLENCODED, body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let lenient = FormPluginOptions {
        on_proto_poisoning: Some(PoisoningAction::Ignore),
        ..Default::default()
    };
    let (status, json) = send(FormPlugin::new(lenient, host).register(routes()), URLENCODED, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "property": "value", "toString": "x" }));
}

#[tokio::test]
async fn test_multipart_without_boundary_fails() {
    let options = FormPluginOptions { urlencoded: Some(false), ..Default::default() };
    let (status, json) = send(app(options), "multipart/form-data", String::new()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Multipart: Boundary not found");
}

/// Decoder that fails as soon as the body is connected.
struct BrokenDecoder;

impl FieldDecoder for BrokenDecoder {
    fn decode(self: Box<Self>, _body: ByteStream) -> EventStream {
        stream::iter(vec![
            DecoderEvent::Error(DecoderError::Stream("Stream error".into())),
            DecoderEvent::field("late", "event"),
            DecoderEvent::Finish,
        ])
        .boxed()
    }
}

struct BrokenDecoders;

impl DecoderFactory for BrokenDecoders {
    fn build(&self, _headers: &HeaderMap, _options: &DecoderOptions) -> Result<Box<dyn FieldDecoder>, DecoderError> {
        Ok(Box::new(BrokenDecoder))
    }
}

#[tokio::test]
async fn test_decoder_stream_error_reaches_client() {
    let options = FormPluginOptions { multipart: Some(false), ..Default::default() };
    let plugin = FormPlugin::with_decoders(options, HostDefaults::default(), BrokenDecoders);
    let (status, json) = send(plugin.register(routes()), URLENCODED, encode_urlencoded(&request_a())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Stream error");
}

#[tokio::test]
async fn test_disabled_content_type_is_not_parsed() {
    let options = FormPluginOptions { urlencoded: Some(false), ..Default::default() };
    let (status, _) = send(app(options), URLENCODED, "a=1".to_string()).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_unrelated_content_type_passes_through() {
    let (status, _) = send(app(FormPluginOptions::default()), "application/json", "{}".to_string()).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_round_trip_both_encodings() {
    let original: ParsedFormBody = vec![("a", FieldValue::from("1")), ("b", FieldValue::from(vec!["2", "3"]))]
        .into_iter()
        .collect();
    let plugin = FormPlugin::new(FormPluginOptions::default(), HostDefaults::default());
    let parser = plugin.parser();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, URLENCODED.parse().unwrap());
    let parsed = parser
        .parse(formbody::decoder::bytes_body(encode_urlencoded(&original)), &headers)
        .await
        .unwrap();
    assert_eq!(parsed, original);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, multipart_type().parse().unwrap());
    let parsed = parser
        .parse(formbody::decoder::bytes_body(encode_multipart(&original, BOUNDARY)), &headers)
        .await
        .unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_plugin_default_options_register_both() {
    let plugin = FormPlugin::new(FormPluginOptions::default(), HostDefaults::default());
    assert!(plugin.has_content_type_parser(FormContentType::Multipart));
    assert!(plugin.has_content_type_parser(FormContentType::Urlencoded));
}

#[test]
fn test_plugin_multipart_only() {
    let options = FormPluginOptions { urlencoded: Some(false), ..Default::default() };
    let plugin = FormPlugin::new(options, HostDefaults::default());
    assert!(plugin.has_content_type_parser(FormContentType::Multipart));
    assert!(!plugin.has_content_type_parser(FormContentType::Urlencoded));
}

#[test]
fn test_plugin_urlencoded_only() {
    let options = FormPluginOptions { multipart: Some(false), ..Default::default() };
    let plugin = FormPlugin::new(options, HostDefaults::default());
    assert!(!plugin.has_content_type_parser(FormContentType::Multipart));
    assert!(plugin.has_content_type_parser(FormContentType::Urlencoded));
}

#[test]
fn test_plugin_registers_nothing() {
    let options = FormPluginOptions {
        multipart: Some(false),
        urlencoded: Some(false),
        ..Default::default()
    };
    let plugin = FormPlugin::new(options, HostDefaults::default());
    assert!(plugin.content_types().is_empty());
    assert!(!plugin.has_content_type_parser(FormContentType::Multipart));
    assert!(!plugin.has_content_type_parser(FormContentType::Urlencoded));
}

#[test]
fn test_plugin_passes_empty_decoder_options_by_default() {
    let plugin = FormPlugin::new(FormPluginOptions::default(), HostDefaults::default());
    assert_eq!(plugin.parser().config().decoder, DecoderOptions::default());
}

#[test]
fn test_plugin_strips_headers_from_decoder_options() {
    let options = FormPluginOptions::from_json(json!({
        "multipart": true,
        "urlencoded": false,
        "headers": { "Connection": "keep-alive" },
        "defCharset": "utf-8",
        "limits": { "fields": 10, "fieldSize": 20 }
    }))
    .unwrap();
    let plugin = FormPlugin::new(options, HostDefaults::default());

    let decoder = &plugin.parser().config().decoder;
    assert_eq!(decoder.def_charset, "utf-8");
    assert_eq!(decoder.limits.fields, Some(10));
    assert_eq!(decoder.limits.field_size, 20);
    assert!(serde_json::to_value(decoder).unwrap().get("headers").is_none());
}
