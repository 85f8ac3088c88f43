//! Folds decoded form fields into a [`ParsedFormBody`].

use crate::error::PoisoningViolation;
use crate::models::{ParsedFormBody, PoisoningAction, PoisoningPolicy};

/// Attach one decoded field to `body` under `policy`.
///
/// Ordinary names are merged into the body: the first occurrence is stored as
/// a single value and later ones turn it into an ordered sequence. Names that
/// shadow an inherited prototype property follow the policy: `ignore` merges
/// them like any other name, `remove` drops them, and `error` fails without
/// touching the body.
pub fn attach(
    body: &mut ParsedFormBody,
    name: &str,
    value: String,
    policy: &PoisoningPolicy,
) -> Result<(), PoisoningViolation> {
    match policy.action_for(name) {
        None | Some(PoisoningAction::Ignore) => {
            tracing::trace!(field = name, "attaching form field");
            body.append(name, value);
            Ok(())
        }
        Some(PoisoningAction::Remove) => {
            tracing::debug!(field = name, "dropping prototype property field");
            Ok(())
        }
        Some(PoisoningAction::Error) => {
            tracing::warn!(field = name, "rejecting prototype property field");
            Err(PoisoningViolation { field: name.to_string() })
        }
    }
}

/// Attach every pair in order, stopping at the first violation.
pub fn accumulate<I, K, V>(pairs: I, policy: &PoisoningPolicy) -> Result<ParsedFormBody, PoisoningViolation>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut body = ParsedFormBody::new();
    for (name, value) in pairs {
        attach(&mut body, name.as_ref(), value.into(), policy)?;
    }
    Ok(body)
}
