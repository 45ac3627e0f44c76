// Central Error Type for configuration builds

use crate::domain::{CapabilityRef, OptionKey, OptionValue};
use crate::port::{EnvironmentError, Export};
use thiserror::Error;

/// Why a referenced capability was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityViolation {
    #[error("could not be resolved")]
    Unresolvable,

    #[error("does not export {0}")]
    MissingExport(Export),
}

/// Configuration build error
///
/// A build stops at the first error; no partial record is produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown option {key}: {value}")]
    UnknownOption { key: String, value: OptionValue },

    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidOption {
        key: OptionKey,
        value: OptionValue,
        reason: String,
    },

    #[error("Invalid {key}: {capability} {violation}")]
    Capability {
        key: OptionKey,
        capability: CapabilityRef,
        violation: CapabilityViolation,
    },

    #[error("Missing required field: {0}")]
    MissingField(OptionKey),

    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),
}

/// Error taxonomy for programmatic matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownOption,
    TypeViolation,
    CapabilityViolation,
    MissingField,
    Environment,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnknownOption { .. } => ErrorKind::UnknownOption,
            ConfigError::InvalidOption { .. } => ErrorKind::TypeViolation,
            ConfigError::Capability { .. } => ErrorKind::CapabilityViolation,
            ConfigError::MissingField(_) => ErrorKind::MissingField,
            ConfigError::Environment(_) => ErrorKind::Environment,
        }
    }

    /// Offending key, as written in the option set
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownOption { key, .. } => Some(key),
            ConfigError::InvalidOption { key, .. }
            | ConfigError::Capability { key, .. }
            | ConfigError::MissingField(key) => Some(key.as_str()),
            ConfigError::Environment(_) => None,
        }
    }

    pub(crate) fn invalid(key: OptionKey, value: &OptionValue, reason: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            key,
            value: value.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;
