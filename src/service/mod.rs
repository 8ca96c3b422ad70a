//! Payload validation ahead of the stores.

pub(crate) mod validation;
pub use validation::{FieldError, ValidationErrors};
