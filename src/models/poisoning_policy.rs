use serde::{Deserialize, Serialize};

use super::poisoning_action::PoisoningAction;

/// Every property name a plain object inherits from its prototype.
pub const RESERVED_PROPERTY_NAMES: &[&str] = &[
    "constructor",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
];

/// The name guarded by `on_constructor_poisoning`.
pub const CONSTRUCTOR_PROPERTY: &str = "constructor";

/// Is `name` one of the inherited prototype property names?
pub fn is_reserved_property(name: &str) -> bool {
    RESERVED_PROPERTY_NAMES.contains(&name)
}

/// Poisoning-defense settings applied to every field of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoisoningPolicy {
    pub on_constructor_poisoning: PoisoningAction,
    pub on_proto_poisoning: PoisoningAction,
}

impl PoisoningPolicy {
    pub fn new(on_constructor_poisoning: PoisoningAction, on_proto_poisoning: PoisoningAction) -> Self {
        Self {
            on_constructor_poisoning,
            on_proto_poisoning,
        }
    }

    /// The action for `name`, or `None` when the name is ordinary.
    pub fn action_for(&self, name: &str) -> Option<PoisoningAction> {
        if name == CONSTRUCTOR_PROPERTY {
            Some(self.on_constructor_poisoning)
        } else if is_reserved_property(name) {
            Some(self.on_proto_poisoning)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_are_case_sensitive() {
        assert!(is_reserved_property("toString"));
        assert!(is_reserved_property("__proto__"));
        assert!(!is_reserved_property("tostring"));
        assert!(!is_reserved_property("Constructor"));
        assert!(!is_reserved_property("property"));
    }

    #[test]
    fn test_action_for_routes_constructor_separately() {
        let policy = PoisoningPolicy::new(PoisoningAction::Error, PoisoningAction::Remove);
        assert_eq!(policy.action_for("constructor"), Some(PoisoningAction::Error));
        assert_eq!(policy.action_for("valueOf"), Some(PoisoningAction::Remove));
        assert_eq!(policy.action_for("hasOwnProperty"), Some(PoisoningAction::Remove));
        assert_eq!(policy.action_for("name"), None);
    }
}
