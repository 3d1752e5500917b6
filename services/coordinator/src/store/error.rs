//! Coordination error types.

use std::fmt::Display;

use thiserror::Error;

/// Failures returned synchronously by the stores and the matcher.
///
/// Nothing in the engine retries on these; every operation is a state
/// mutation without a dedupe key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    /// A camp, volunteer or task id did not resolve.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Input failed validation (missing field, out of range, duplicate).
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The write would double-book a volunteer.
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
}

impl CoordinationError {
    pub fn not_found(kind: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable code, e.g. `camp_not_found`, `invalid_quantity`.
    pub fn code(&self) -> String {
        match self {
            Self::NotFound { kind, .. } => format!("{}_not_found", kind.replace(' ', "_")),
            Self::Validation { field, .. } => format!("invalid_{field}"),
            Self::Conflict { code, .. } => (*code).to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
