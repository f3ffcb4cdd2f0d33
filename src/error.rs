//! Error types for export request handling.

use core::fmt;

use crate::export::{LanguageId, LanguageRole};

/// Errors raised while resolving an export request against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// A language identifier did not resolve. This is a client error.
    UnknownLanguage { role: LanguageRole, id: LanguageId },
    /// The catalog could not be read or produced malformed data.
    Catalog { message: String },
}

impl ExportError {
    /// Whether the failure is attributable to the request rather than the
    /// system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownLanguage { .. })
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLanguage { role, id } => {
                write!(f, "unknown {} language id {}", role, id)
            }
            Self::Catalog { message } => write!(f, "catalog error: {}", message),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Catalog {
            message: value.to_string(),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Catalog {
            message: value.to_string(),
        }
    }
}
