//! # VESSEL ERROR TYPES
//!
//! **MANDATE**: Every fallible registry operation returns `RegistryResult<T>`.
//! **GUARANTEE**: Callers match on variants, never on message text.

use thiserror::Error;

/// **REGISTRY ERROR CODES**
///
/// Stable identifiers for each error variant, suitable for embedding hosts
/// that forward failures across a process or language boundary.
pub mod error_codes {
    pub const ALREADY_EXISTS: &str = "VESSEL_REGISTRY_ALREADY_EXISTS";
    pub const NOT_FOUND: &str = "VESSEL_REGISTRY_NOT_FOUND";
    pub const CYCLIC_ALIAS: &str = "VESSEL_REGISTRY_CYCLIC_ALIAS";
    pub const TYPE_MISMATCH: &str = "VESSEL_REGISTRY_TYPE_MISMATCH";
    pub const PROVIDER_FAILED: &str = "VESSEL_REGISTRY_PROVIDER_FAILED";
    pub const CONFIG_INVALID: &str = "VESSEL_CONFIG_INVALID";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A service or provider was registered over a key that already holds an instance.
    #[error("An instance for entry '{key}' already exists.")]
    AlreadyExists { key: String },

    /// The resolved key has neither a stored instance nor a provider.
    #[error("Entry '{key}' not found.")]
    NotFound { key: String },

    /// An alias walk revisited `key`.
    #[error("Cyclic alias '{key}'.")]
    CyclicAlias { key: String },

    /// `get_as` found an instance of a different concrete type.
    #[error("Entry '{key}' is not of type '{expected}'.")]
    TypeMismatch { key: String, expected: &'static str },

    /// A provider or decorator refused to construct the entry.
    #[error("Provider for entry '{key}' failed: {message}")]
    Provider { key: String, message: String },

    /// A declarative configuration document could not be read.
    #[error("Invalid registry configuration: {message}")]
    Config { message: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists { key: key.into() }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn cyclic_alias(key: impl Into<String>) -> Self {
        Self::CyclicAlias { key: key.into() }
    }

    /// **PROVIDER FAILURE** - For use inside `Provider::build` / `Decorator::decorate`
    pub fn provider(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            key: key.into(),
            message: message.into(),
        }
    }

    /// **STABLE ERROR CODE**
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => error_codes::ALREADY_EXISTS,
            Self::NotFound { .. } => error_codes::NOT_FOUND,
            Self::CyclicAlias { .. } => error_codes::CYCLIC_ALIAS,
            Self::TypeMismatch { .. } => error_codes::TYPE_MISMATCH,
            Self::Provider { .. } => error_codes::PROVIDER_FAILED,
            Self::Config { .. } => error_codes::CONFIG_INVALID,
        }
    }

    /// Key the failure refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::AlreadyExists { key }
            | Self::NotFound { key }
            | Self::CyclicAlias { key }
            | Self::TypeMismatch { key, .. }
            | Self::Provider { key, .. } => Some(key),
            Self::Config { .. } => None,
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
