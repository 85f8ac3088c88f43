use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::Path;

use crate::decoder::DecoderOptions;
use crate::error::ConfigError;
use crate::models::{PoisoningAction, PoisoningPolicy};
use crate::utils::parse_flag;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MULTIPART: bool = true;
pub const DEFAULT_URLENCODED: bool = true;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_host() -> String {
    env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_on_constructor_poisoning() -> Option<PoisoningAction> {
    action_from_env("ON_CONSTRUCTOR_POISONING")
}

pub fn get_on_proto_poisoning() -> Option<PoisoningAction> {
    action_from_env("ON_PROTO_POISONING")
}

pub fn get_multipart_flag() -> Option<bool> {
    env::var("FORM_MULTIPART")
        .ok()
        .map(|v| parse_flag(Some(v.as_str()), DEFAULT_MULTIPART))
}

pub fn get_urlencoded_flag() -> Option<bool> {
    env::var("FORM_URLENCODED")
        .ok()
        .map(|v| parse_flag(Some(v.as_str()), DEFAULT_URLENCODED))
}

fn action_from_env(var: &str) -> Option<PoisoningAction> {
    let raw = env::var(var).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(action) => Some(action),
        Err(e) => {
            tracing::warn!(%e, var, "ignoring invalid poisoning action");
            None
        }
    }
}

/// Poisoning defaults inherited from the host server instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDefaults {
    pub on_constructor_poisoning: Option<PoisoningAction>,
    pub on_proto_poisoning: Option<PoisoningAction>,
}

impl HostDefaults {
    pub fn from_env() -> Self {
        Self {
            on_constructor_poisoning: get_on_constructor_poisoning(),
            on_proto_poisoning: get_on_proto_poisoning(),
        }
    }
}

/// Options supplied by whoever registers the plugin.
///
/// Decoder options sit at the top level next to the plugin's own flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPluginOptions {
    pub multipart: Option<bool>,
    pub urlencoded: Option<bool>,
    pub on_constructor_poisoning: Option<PoisoningAction>,
    pub on_proto_poisoning: Option<PoisoningAction>,
    #[serde(flatten)]
    pub decoder: DecoderOptions,
}

impl FormPluginOptions {
    /// Parse options from JSON. A `headers` key is discarded: decoder
    /// headers always come from the request being parsed.
    pub fn from_json(mut value: Value) -> Result<Self, ConfigError> {
        if let Value::Object(map) = &mut value {
            if map.remove("headers").is_some() {
                tracing::debug!("dropping caller supplied headers from plugin options");
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Content-type switches taken from `FORM_MULTIPART` / `FORM_URLENCODED`.
    pub fn from_env() -> Self {
        Self {
            multipart: get_multipart_flag(),
            urlencoded: get_urlencoded_flag(),
            ..Self::default()
        }
    }
}

/// What the parser needs for every request: the policy and the raw decoder
/// options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub policy: PoisoningPolicy,
    pub decoder: DecoderOptions,
}

/// Fully merged configuration of one plugin registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub multipart: bool,
    pub urlencoded: bool,
    pub policy: PoisoningPolicy,
    pub decoder: DecoderOptions,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self::merge(&HostDefaults::default(), &FormPluginOptions::default())
    }
}

impl EffectiveConfig {
    /// Defaults, then host values, then caller values; the later layer wins.
    pub fn merge(host: &HostDefaults, options: &FormPluginOptions) -> Self {
        let on_constructor_poisoning = options
            .on_constructor_poisoning
            .or(host.on_constructor_poisoning)
            .unwrap_or_default();
        let on_proto_poisoning = options
            .on_proto_poisoning
            .or(host.on_proto_poisoning)
            .unwrap_or_default();

        Self {
            multipart: options.multipart.unwrap_or(DEFAULT_MULTIPART),
            urlencoded: options.urlencoded.unwrap_or(DEFAULT_URLENCODED),
            policy: PoisoningPolicy::new(on_constructor_poisoning, on_proto_poisoning),
            decoder: options.decoder.clone(),
        }
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            policy: self.policy,
            decoder: self.decoder.clone(),
        }
    }
}
