//! Turns one request body into a [`ParsedFormBody`].
//!
//! [`FormParser::parse`] builds a decoder for the request, feeds each field
//! event to the accumulator, and settles exactly once: with the body when the
//! decoder finishes, or with the first error from decoder setup, the stream
//! or the poisoning policy.

use std::sync::Arc;

use axum::http::HeaderMap;
use futures_util::StreamExt;

use crate::accumulator::attach;
use crate::config::ParserConfig;
use crate::decoder::{ByteStream, DecoderEvent, DecoderFactory, FormDecoders};
use crate::error::FormError;
use crate::models::{ParsedFormBody, PoisoningPolicy};

pub const UNEXPECTED_END: &str = "Unexpected end of form";

/// Progress of a single parse operation
#[derive(Debug)]
pub enum ParseState {
    /// Nothing received yet
    Idle,
    /// At least one field attached, no terminal event yet
    Receiving(ParsedFormBody),
    /// Outcome decided; later events are ignored
    Settled(Result<ParsedFormBody, FormError>),
}

/// Single-settlement state machine driven by decoder events.
#[derive(Debug)]
pub struct ParseMachine {
    policy: PoisoningPolicy,
    state: ParseState,
}

impl ParseMachine {
    pub fn new(policy: PoisoningPolicy) -> Self {
        Self {
            policy,
            state: ParseState::Idle,
        }
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, ParseState::Settled(_))
    }

    /// Apply one event. Returns `true` once the machine is settled.
    pub fn on_event(&mut self, event: DecoderEvent) -> bool {
        let state = std::mem::replace(&mut self.state, ParseState::Idle);
        self.state = match state {
            ParseState::Settled(outcome) => {
                tracing::trace!(?event, "ignoring decoder event after settlement");
                ParseState::Settled(outcome)
            }
            ParseState::Idle => self.advance(ParsedFormBody::new(), event),
            ParseState::Receiving(body) => self.advance(body, event),
        };
        self.is_settled()
    }

    fn advance(&self, mut body: ParsedFormBody, event: DecoderEvent) -> ParseState {
        match event {
            DecoderEvent::Field { name, value } => match attach(&mut body, &name, value, &self.policy) {
                Ok(()) => ParseState::Receiving(body),
                Err(violation) => ParseState::Settled(Err(violation.into())),
            },
            DecoderEvent::Finish => ParseState::Settled(Ok(body)),
            DecoderEvent::Error(e) => ParseState::Settled(Err(e.into())),
        }
    }

    /// The settled outcome, or an `Unexpected end of form` error when the
    /// event stream ended before a terminal event.
    pub fn finish(self) -> Result<ParsedFormBody, FormError> {
        match self.state {
            ParseState::Settled(outcome) => outcome,
            ParseState::Idle | ParseState::Receiving(_) => Err(FormError::DecoderStream(UNEXPECTED_END.to_string())),
        }
    }
}

/// Parser adapter bound to a decoder factory and a merged configuration.
pub struct FormParser<D = FormDecoders> {
    config: Arc<ParserConfig>,
    decoders: Arc<D>,
}

impl FormParser<FormDecoders> {
    pub fn new(config: ParserConfig) -> Self {
        Self::with_decoders(config, FormDecoders)
    }
}

impl<D: DecoderFactory> FormParser<D> {
    pub fn with_decoders(config: ParserConfig, decoders: D) -> Self {
        Self {
            config: Arc::new(config),
            decoders: Arc::new(decoders),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one request body.
    ///
    /// The decoder is built from `headers` plus the configured decoder
    /// options before the body is touched; a build failure is returned as
    /// [`FormError::DecoderSetup`] with the stream left unread.
    pub async fn parse(&self, body: ByteStream, headers: &HeaderMap) -> Result<ParsedFormBody, FormError> {
        let decoder = self
            .decoders
            .build(headers, &self.config.decoder)
            .map_err(|e| {
                tracing::debug!(error = %e, "form decoder setup failed");
                FormError::from(e)
            })?;

        let mut events = decoder.decode(body);
        let mut machine = ParseMachine::new(self.config.policy);
        tracing::debug!("parsing form body");

        while let Some(event) = events.next().await {
            if machine.on_event(event) {
                break;
            }
        }

        let outcome = machine.finish();
        match &outcome {
            Ok(body) => tracing::debug!(fields = body.len(), "form body parsed"),
            Err(e) => tracing::debug!(error = %e, "form body rejected"),
        }
        outcome
    }
}

impl<D> Clone for FormParser<D> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            decoders: Arc::clone(&self.decoders),
        }
    }
}

impl<D> std::fmt::Debug for FormParser<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormParser").field("config", &self.config).finish()
    }
}
