use futures_util::stream::{self, StreamExt};
use multer::Multipart;

use super::charset::Charset;
use super::options::{truncate_str, Limits};
use super::{ByteStream, DecoderEvent, EventStream, FieldDecoder};
use crate::error::DecoderError;
use crate::utils::content_type_param;

pub const BOUNDARY_NOT_FOUND: &str = "Multipart: Boundary not found";

/// `multipart/form-data` decoder backed by `multer`.
///
/// Only plain fields are reported; file parts are skipped unread.
#[derive(Debug, Clone)]
pub struct MultipartDecoder {
    content_type: String,
    charset: Charset,
    limits: Limits,
}

impl MultipartDecoder {
    pub fn new(content_type: &str, charset: Charset, limits: Limits) -> Self {
        Self {
            content_type: content_type.to_string(),
            charset,
            limits,
        }
    }
}

struct MultipartState {
    multipart: Multipart<'static>,
    charset: Charset,
    limits: Limits,
    fields_seen: usize,
    parts_seen: usize,
    done: bool,
}

fn stream_error(e: impl std::fmt::Display) -> DecoderEvent {
    DecoderEvent::Error(DecoderError::Stream(format!("Multipart: {}", e)))
}

impl FieldDecoder for MultipartDecoder {
    fn decode(self: Box<Self>, body: ByteStream) -> EventStream {
        let boundary = match multer::parse_boundary(&self.content_type) {
            Ok(boundary) => boundary,
            Err(e) => {
                tracing::debug!(error = %e, content_type = %self.content_type, "no multipart boundary");
                return stream::once(async {
                    DecoderEvent::Error(DecoderError::Stream(BOUNDARY_NOT_FOUND.to_string()))
                })
                .boxed();
            }
        };

        let state = MultipartState {
            multipart: Multipart::new(body, boundary),
            charset: self.charset,
            limits: self.limits,
            fields_seen: 0,
            parts_seen: 0,
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if state.done {
                    return None;
                }
                let mut field = match state.multipart.next_field().await {
                    Ok(Some(field)) => field,
                    Ok(None) => {
                        state.done = true;
                        return Some((DecoderEvent::Finish, state));
                    }
                    Err(e) => {
                        state.done = true;
                        return Some((stream_error(e), state));
                    }
                };

                if !state.limits.admits_part(state.parts_seen) {
                    tracing::warn!(limit = ?state.limits.parts, "multipart part limit reached, dropping part");
                    continue;
                }
                state.parts_seen += 1;

                if field.file_name().is_some() {
                    tracing::trace!(field = ?field.name(), "skipping file part");
                    continue;
                }
                let name = match field.name() {
                    Some(name) if !name.is_empty() => truncate_str(name, state.limits.field_name_size).to_string(),
                    _ => {
                        tracing::trace!("skipping multipart part without a name");
                        continue;
                    }
                };
                if !state.limits.admits_field(state.fields_seen) {
                    tracing::warn!(limit = ?state.limits.fields, "multipart field limit reached, dropping field");
                    continue;
                }
                state.fields_seen += 1;

                let charset = field
                    .content_type()
                    .and_then(|mime| content_type_param(mime.as_ref(), "charset"))
                    .and_then(|label| Charset::from_label(&label))
                    .unwrap_or(state.charset);

                let mut raw = Vec::new();
                let mut truncated = false;
                loop {
                    match field.chunk().await {
                        Ok(Some(chunk)) => {
                            let room = state.limits.field_size.saturating_sub(raw.len());
                            if chunk.len() > room {
                                truncated = true;
                            }
                            raw.extend_from_slice(&chunk[..chunk.len().min(room)]);
                        }
                        Ok(None) => break,
                        Err(e) => {
                            state.done = true;
                            return Some((stream_error(e), state));
                        }
                    }
                }
                if truncated {
                    tracing::warn!(field = %name, limit = state.limits.field_size, "multipart field value truncated");
                }

                let value = charset.decode(&raw);
                return Some((DecoderEvent::Field { name, value }, state));
            }
        })
        .boxed()
    }
}
