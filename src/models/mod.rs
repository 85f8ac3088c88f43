pub mod field_value;
pub mod parsed_form_body;
pub mod poisoning_action;
pub mod poisoning_policy;

pub use field_value::FieldValue;
pub use parsed_form_body::ParsedFormBody;
pub use poisoning_action::PoisoningAction;
pub use poisoning_policy::PoisoningPolicy;
