//! Error types for the codec and the registry.

use thiserror::Error;

/// A value could not be converted to or from its textual / node form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("cannot decode {input:?} as {type_name}: {reason}")]
    Decode {
        type_name: &'static str,
        input: String,
        reason: String,
    },
    #[error("cannot encode {type_name}: {reason}")]
    Encode {
        type_name: &'static str,
        reason: String,
    },
}

impl CodecError {
    pub(crate) fn decode(
        type_name: &'static str,
        input: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        CodecError::Decode {
            type_name,
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(type_name: &'static str, reason: impl std::fmt::Display) -> Self {
        CodecError::Encode {
            type_name,
            reason: reason.to_string(),
        }
    }
}

/// Failures surfaced by [`Registry`](crate::Registry) to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name contains characters outside `[A-Za-z0-9._]` or is empty.
    #[error("invalid config variable name: {0:?}")]
    InvalidName(String),

    /// A variable with this name exists but holds a different type.
    #[error(
        "config variable {name:?} holds {stored} (current value {value:?}), requested {requested}"
    )]
    TypeMismatch {
        name: String,
        stored: &'static str,
        requested: &'static str,
        value: String,
    },

    /// The document source could not be read or parsed.
    #[error("cannot load config document: {0}")]
    Document(String),
}

impl From<config::ConfigError> for RegistryError {
    fn from(err: config::ConfigError) -> Self {
        RegistryError::Document(err.to_string())
    }
}
