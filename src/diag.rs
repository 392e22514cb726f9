//! Diagnostics accumulated while extracting and resolving a schema.
//!
//! Recoverable findings never surface as `Err`; they are collected here
//! alongside the best-effort result so a partial model is still usable.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// What a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    /// A `CREATE TABLE` block that could not be parsed into name + body.
    MalformedStatement,
    /// Second definition of an already-seen table name.
    DuplicateTable,
    /// Repeated column name within one table body.
    DuplicateColumn,
    /// Foreign key naming a table or column absent from the model.
    UnresolvedReference,
}

impl DiagKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagKind::MalformedStatement | DiagKind::DuplicateColumn => Severity::Warning,
            DiagKind::DuplicateTable | DiagKind::UnresolvedReference => Severity::Error,
        }
    }
}

/// One finding, with enough context to locate the offending input fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub message: String,
    /// A line for statement-level findings, table/column names for
    /// model-level ones.
    pub location: String,
}

impl Diagnostic {
    pub fn new(kind: DiagKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: location.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {} ({})", severity, self.message, self.location)
    }
}
