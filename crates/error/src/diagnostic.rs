use std::fmt;

use ace_span::SrcLocation;
use serde::{Deserialize, Serialize};

use crate::DiagnosticCode;

/// Severity of a single diagnostic. The ordering matters: a bag's severity
/// is the maximum over its diagnostics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Severity {
    #[default]
    Info,
    Note,
    Warning,
    Error,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One message with a severity, an optional primary location and an
/// optional machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Option<SrcLocation>,
    pub message: String,
    pub code: Option<DiagnosticCode>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        location: Option<SrcLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            location,
            message: message.into(),
            code: None,
        }
    }

    pub fn error(location: SrcLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, Some(location), message)
    }

    pub fn warning(location: SrcLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, Some(location), message)
    }

    pub fn note(location: SrcLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, Some(location), message)
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A primary diagnostic together with its attached notes. Notes render
/// under the primary message in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticGroup {
    pub primary: Diagnostic,
    pub notes: Vec<Diagnostic>,
}

impl DiagnosticGroup {
    pub fn new(primary: Diagnostic) -> Self {
        Self {
            primary,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.notes.push(note);
        self
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.primary.severity
    }

    #[inline]
    pub fn code(&self) -> Option<DiagnosticCode> {
        self.primary.code
    }
}

impl From<Diagnostic> for DiagnosticGroup {
    fn from(primary: Diagnostic) -> Self {
        DiagnosticGroup::new(primary)
    }
}
