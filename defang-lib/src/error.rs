use thiserror::Error;

/// A configuration under which the isolation guarantees cannot be met.
///
/// Raised once, when a `Sanitizer` is built; sanitizing itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("scope prefix {0:?} is not a valid CSS identifier")]
    InvalidScopePrefix(String),

    #[error("{kind} name {name:?} must be non-empty lowercase ASCII")]
    InvalidName { kind: &'static str, name: String },

    #[error("data-* attributes cannot be scoped and must stay disabled")]
    DataAttributesUnsupported,

    #[error("container style {0:?} has no allowed declarations")]
    InvalidContainerStyle(String),
}
