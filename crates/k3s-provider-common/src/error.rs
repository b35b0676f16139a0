//! Error types for the k3s provider
//!
//! Every error here aborts the invocation: a half-applied configuration for a
//! cluster bootstrap component is worse than a hard failure, so there is no
//! partial-success path and nothing is retried.

use thiserror::Error;

/// Main error type for configuration rendering
#[derive(Debug, Error)]
pub enum Error {
    /// The free-form override document could not be parsed
    #[error("override document error for {role}: {message}")]
    OverrideDocument {
        /// Role of the node being rendered (init, controlplane, worker)
        role: String,
        /// Description of what's malformed
        message: String,
    },

    /// A value could not be coerced into the kind its option key expects
    #[error("invalid value for option `{key}`: {message}")]
    OptionValue {
        /// External option key (e.g., "node-label")
        key: String,
        /// Description of the mismatch
        message: String,
    },

    /// The CIDR-bearing options used for no-proxy derivation are malformed
    #[error("proxy options error: {message}")]
    ProxyOptions {
        /// Description of what failed
        message: String,
        /// The option key involved (if known)
        key: Option<String>,
    },

    /// The cluster descriptor is missing required facts
    #[error("invalid cluster descriptor: {message}")]
    Descriptor {
        /// Description of what's invalid
        message: String,
        /// The descriptor field (e.g., "control_plane_host")
        field: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The document kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create an override document error for the given role
    pub fn override_document(role: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::OverrideDocument {
            role: role.into(),
            message: msg.into(),
        }
    }

    /// Create an option value error for an external key
    pub fn option_value(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::OptionValue {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Create a proxy options error for a specific option key
    pub fn proxy_options_for_key(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProxyOptions {
            message: msg.into(),
            key: Some(key.into()),
        }
    }

    /// Create a descriptor error naming the offending field
    pub fn descriptor_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Descriptor {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with document kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Get the option key if this error is tied to one
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::OptionValue { key, .. } => Some(key.as_str()),
            Error::ProxyOptions { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::serialization(e.to_string())
    }
}
