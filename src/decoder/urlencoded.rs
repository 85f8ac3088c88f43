use std::collections::VecDeque;

use futures_util::stream::{self, StreamExt};

use super::charset::Charset;
use super::options::Limits;
use super::{ByteStream, DecoderEvent, EventStream, FieldDecoder};
use crate::error::DecoderError;
use crate::utils::decode_component;

/// `%XX` is the widest escape.
const MAX_ESCAPE_WIDTH: usize = 3;

/// Longest UTF-8 character, in bytes.
const MAX_CHAR_WIDTH: usize = 4;

/// Raw bytes to keep so that decoding still yields `limit` bytes plus the
/// whole character straddling the cut.
fn raw_bound(limit: usize) -> usize {
    limit.saturating_add(MAX_CHAR_WIDTH).saturating_mul(MAX_ESCAPE_WIDTH)
}

/// Streaming `application/x-www-form-urlencoded` decoder.
///
/// Pairs are emitted as soon as their terminating `&` arrives, so a pair may
/// span any number of body chunks. Only the pair in progress is buffered, and
/// its raw name and value stop growing once they can no longer fit the limits.
#[derive(Debug, Clone)]
pub struct UrlencodedDecoder {
    charset: Charset,
    limits: Limits,
}

impl UrlencodedDecoder {
    pub fn new(charset: Charset, limits: Limits) -> Self {
        Self { charset, limits }
    }
}

struct UrlencodedState {
    body: ByteStream,
    raw_name: Vec<u8>,
    raw_value: Vec<u8>,
    in_value: bool,
    pending: VecDeque<DecoderEvent>,
    charset: Charset,
    limits: Limits,
    fields_seen: usize,
    done: bool,
}

/// Append as much of `bytes` as fits under `bound`, discarding the rest.
fn append_bounded(buffer: &mut Vec<u8>, bytes: &[u8], bound: usize) {
    let room = bound.saturating_sub(buffer.len());
    buffer.extend_from_slice(&bytes[..room.min(bytes.len())]);
}

impl UrlencodedState {
    /// Scan only the new chunk; earlier bytes were already split.
    fn feed(&mut self, mut chunk: &[u8]) {
        loop {
            match chunk.iter().position(|&b| b == b'&') {
                Some(pos) => {
                    self.append_segment(&chunk[..pos]);
                    self.complete_pair();
                    chunk = &chunk[pos + 1..];
                }
                None => {
                    self.append_segment(chunk);
                    return;
                }
            }
        }
    }

    fn append_segment(&mut self, mut segment: &[u8]) {
        if !self.in_value {
            match segment.iter().position(|&b| b == b'=') {
                Some(eq) => {
                    let bound = raw_bound(self.limits.field_name_size);
                    append_bounded(&mut self.raw_name, &segment[..eq], bound);
                    self.in_value = true;
                    segment = &segment[eq + 1..];
                }
                None => {
                    let bound = raw_bound(self.limits.field_name_size);
                    append_bounded(&mut self.raw_name, segment, bound);
                    return;
                }
            }
        }
        let bound = raw_bound(self.limits.field_size);
        append_bounded(&mut self.raw_value, segment, bound);
    }

    fn complete_pair(&mut self) {
        let raw_name = std::mem::take(&mut self.raw_name);
        let raw_value = std::mem::take(&mut self.raw_value);
        let in_value = std::mem::replace(&mut self.in_value, false);
        if raw_name.is_empty() && !in_value {
            return;
        }
        self.push_pair(&raw_name, &raw_value);
    }

    fn push_pair(&mut self, raw_name: &[u8], raw_value: &[u8]) {
        let mut name = decode_component(raw_name);
        if name.is_empty() {
            tracing::trace!("skipping urlencoded pair without a name");
            return;
        }
        if !self.limits.admits_field(self.fields_seen) {
            tracing::warn!(limit = ?self.limits.fields, "urlencoded field limit reached, dropping field");
            return;
        }
        self.fields_seen += 1;

        let mut value = decode_component(raw_value);
        self.charset.truncate(&mut name, self.limits.field_name_size);
        if self.charset.truncate(&mut value, self.limits.field_size) {
            tracing::warn!(limit = self.limits.field_size, "urlencoded field value truncated");
        }
        self.pending.push_back(DecoderEvent::Field {
            name: self.charset.decode(&name),
            value: self.charset.decode(&value),
        });
    }
}

impl FieldDecoder for UrlencodedDecoder {
    fn decode(self: Box<Self>, body: ByteStream) -> EventStream {
        let state = UrlencodedState {
            body,
            raw_name: Vec::new(),
            raw_value: Vec::new(),
            in_value: false,
            pending: VecDeque::new(),
            charset: self.charset,
            limits: self.limits,
            fields_seen: 0,
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Some((event, state));
                }
                if state.done {
                    return None;
                }
                match state.body.next().await {
                    Some(Ok(chunk)) => {
                        state.feed(&chunk);
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        state
                            .pending
                            .push_back(DecoderEvent::Error(DecoderError::Stream(e.to_string())));
                    }
                    None => {
                        state.done = true;
                        state.complete_pair();
                        state.pending.push_back(DecoderEvent::Finish);
                    }
                }
            }
        })
        .boxed()
    }
}
