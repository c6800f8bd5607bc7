use std::fmt;

use serde::Serialize;

use crate::position::Position;

pub const E_IO: &str = "E_IO";
pub const E_UNCLOSED: &str = "E_UNCLOSED";
pub const E_NOT_OPEN: &str = "E_NOT_OPEN";
pub const E_ALREADY_OPEN: &str = "E_ALREADY_OPEN";
pub const E_OUT_OF_CONTEXT: &str = "E_OUT_OF_CONTEXT";
pub const E_STILL_OPEN: &str = "E_STILL_OPEN";
pub const E_HEADING_LEVEL: &str = "E_HEADING_LEVEL";
pub const E_HEADING_EMPTY: &str = "E_HEADING_EMPTY";
pub const E_HEADING_NO_ID: &str = "E_HEADING_NO_ID";
pub const E_HEADING_DUP: &str = "E_HEADING_DUP";
pub const E_LINK_UNRESOLVED: &str = "E_LINK_UNRESOLVED";
pub const E_UNTERMINATED: &str = "E_UNTERMINATED";
pub const E_FORMAT: &str = "E_FORMAT";
pub const E_IMAGE: &str = "E_IMAGE";

pub const W_TAG_UNSUPPORTED: &str = "W_TAG_UNSUPPORTED";
pub const W_RULES_MISSING: &str = "W_RULES_MISSING";

/// A problem found while generating, tied to the file and line that caused it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        position: &Position,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: position.file.display().to_string(),
            line: position.line,
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn error(position: &Position, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(position, DiagnosticSeverity::Error, code, message)
    }

    pub fn warning(position: &Position, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(position, DiagnosticSeverity::Warning, code, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gendoc {}: {}:{}: {}",
            self.severity, self.file, self.line, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        })
    }
}

/// Number of diagnostics that count against a clean run. Warnings never do.
pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|diag| diag.is_error()).count()
}
