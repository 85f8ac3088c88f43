use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// What to do when a field name collides with an inherited prototype
/// property name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoisoningAction {
    /// Attach the field like any other name.
    #[default]
    Ignore,
    /// Fail the whole parse.
    Error,
    /// Drop the field silently.
    Remove,
}

impl PoisoningAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Error => "error",
            Self::Remove => "remove",
        }
    }
}

impl FromStr for PoisoningAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "error" => Ok(Self::Error),
            "remove" => Ok(Self::Remove),
            other => Err(ConfigError::InvalidPoisoningAction(other.to_string())),
        }
    }
}

impl fmt::Display for PoisoningAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
