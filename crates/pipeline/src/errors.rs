//! Error types for the Buildhook domain.
//!
//! [`TriggerError`] covers the ways a single build trigger can fail. It is
//! recorded inside a [`crate::TriggerOutcome`] and never aborts a batch.
//!
//! [`ConfigurationError`] is the only error that prevents the handler from
//! running at all: it is produced while the process starts, before any record
//! is looked at.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Per-record trigger failures
// ---------------------------------------------------------------------------

/// Coarse classification of a [`TriggerError`], used for log fields and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerErrorKind {
    /// The CI server answered with a non-2xx status.
    HttpError,
    /// The CI server could not be reached, or the call timed out.
    NetworkError,
    /// Any other failure while building or performing the call.
    UnknownError,
}

impl std::fmt::Display for TriggerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HttpError => "http_error",
            Self::NetworkError => "network_error",
            Self::UnknownError => "unknown_error",
        };
        f.write_str(s)
    }
}

/// Why a single build trigger failed.
///
/// Produced by [`crate::BuildTrigger`] implementations. The batch handler
/// records it against the record and moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerError {
    /// The remote explicitly rejected the trigger.
    #[error("HTTP error {status} {reason}")]
    Http {
        /// Status code returned by the remote.
        status: u16,
        /// Reason phrase for `status`; empty when the status is non-standard.
        reason: String,
    },

    /// Transport-level failure: DNS, connection refused, TLS, or timeout.
    #[error("Network error: {reason}")]
    Network {
        /// Underlying cause as reported by the transport.
        reason: String,
    },

    /// Anything else that went wrong during dispatch.
    #[error("Unexpected error: {description}")]
    Unknown {
        /// Description of the failure.
        description: String,
    },
}

impl TriggerError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> TriggerErrorKind {
        match self {
            Self::Http { .. } => TriggerErrorKind::HttpError,
            Self::Network { .. } => TriggerErrorKind::NetworkError,
            Self::Unknown { .. } => TriggerErrorKind::UnknownError,
        }
    }
}

// ---------------------------------------------------------------------------
// Startup failures
// ---------------------------------------------------------------------------

/// Required configuration is missing or invalid.
///
/// Fatal: the process never starts processing batches with a bad config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required setting was not supplied, or was supplied empty.
    #[error("Configuration error: required setting '{setting}' is missing or empty")]
    Missing {
        /// Name of the setting (as exposed to operators, e.g. `JENKINS_URL`).
        setting: &'static str,
    },

    /// A setting was supplied but cannot be used.
    #[error("Configuration error: setting '{setting}' is invalid: {reason}")]
    Invalid {
        /// Name of the setting.
        setting: &'static str,
        /// What is wrong with the supplied value.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let http = TriggerError::Http {
            status: 403,
            reason: "Forbidden".into(),
        };
        assert_eq!(http.kind(), TriggerErrorKind::HttpError);
        assert_eq!(http.to_string(), "HTTP error 403 Forbidden");

        let net = TriggerError::Network {
            reason: "connection refused".into(),
        };
        assert_eq!(net.kind(), TriggerErrorKind::NetworkError);
    }

    #[test]
    fn serialises_with_kind_tag() {
        let err = TriggerError::Unknown {
            description: "boom".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "unknown");
        assert_eq!(json["description"], "boom");
    }

    #[test]
    fn configuration_error_names_the_setting() {
        let err = ConfigurationError::Missing {
            setting: "JENKINS_URL",
        };
        assert!(err.to_string().contains("JENKINS_URL"));
    }
}
