//! Error kinds surfaced by the store and the catalog operations

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::identity::EntityKind;

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// JSON pointer of the offending field ("" for the input itself)
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error, Diagnostic)]
pub enum TaxonomyError {
    #[error("validation failed ({} error(s)): {}", violations.len(), summarize(violations))]
    #[diagnostic(
        code(taxo::validation),
        help("fix every listed field; nothing was written")
    )]
    Validation { violations: Vec<Violation> },

    #[error("{kind} with UID {uid} not found")]
    #[diagnostic(code(taxo::not_found))]
    NotFound { kind: EntityKind, uid: String },

    #[error("no entity found with UID {0}")]
    #[diagnostic(code(taxo::unknown_uid))]
    UnknownUid(String),

    #[error("{field}: referenced {kind} with UID {uid} not found")]
    #[diagnostic(code(taxo::reference_not_found))]
    ReferenceNotFound {
        field: String,
        kind: EntityKind,
        uid: String,
    },

    #[error("{0}")]
    #[diagnostic(code(taxo::conflict))]
    Conflict(String),

    #[error("cannot delete {kind} {uid}: {count} dependent {dependent}(s) reference it")]
    #[diagnostic(
        code(taxo::dependency),
        help("delete or re-point the dependent records first")
    )]
    Dependency {
        kind: EntityKind,
        uid: String,
        dependent: EntityKind,
        count: usize,
    },

    #[error("{0}")]
    #[diagnostic(code(taxo::invalid_operation))]
    InvalidOperation(String),

    #[error("failed to access {}: {source}", path.display())]
    #[diagnostic(code(taxo::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection file {}: {source}", path.display())]
    #[diagnostic(code(taxo::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TaxonomyError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        TaxonomyError::Validation { violations }
    }

    pub fn not_found(kind: EntityKind, uid: impl Into<String>) -> Self {
        TaxonomyError::NotFound {
            kind,
            uid: uid.into(),
        }
    }

    pub fn reference(field: impl Into<String>, kind: EntityKind, uid: impl Into<String>) -> Self {
        TaxonomyError::ReferenceNotFound {
            field: field.into(),
            kind,
            uid: uid.into(),
        }
    }

    /// The per-field violations of a validation failure
    pub fn violations(&self) -> &[Violation] {
        match self {
            TaxonomyError::Validation { violations } => violations,
            _ => &[],
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TaxonomyError::Validation { .. })
    }
}

pub type Result<T, E = TaxonomyError> = std::result::Result<T, E>;
