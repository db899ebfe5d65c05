//! Compiler diagnostics data model.
//!
//! Diagnostics are produced fresh by every compile call and superseded wholesale by the next
//! one; nothing in the core mutates them. The serde shape matches what the compiler module
//! emits (`span.start.line`, `is_error`, ...), so results can be decoded without an adapter.
//!
//! Lines are 1-based. Columns are 0-based character offsets; the marker mapper performs the
//! conversion to the editor's 1-based columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line/column position reported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineColumn {
    /// Line number (1-based).
    pub line: usize,
    /// Column (0-based, in characters).
    pub column: usize,
}

impl LineColumn {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The source range a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Range start.
    pub start: LineColumn,
    /// Range end. `None` means the range extends to the end of the document.
    pub end: Option<LineColumn>,
}

impl Span {
    /// Create a span with an explicit end.
    pub fn new(start: LineColumn, end: LineColumn) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Create a span that starts at `start` and runs to the end of the document.
    pub fn to_end_of_document(start: LineColumn) -> Self {
        Self { start, end: None }
    }

    /// The span the compiler reports when it has no precise location (whole document).
    pub fn call_site() -> Self {
        Self::to_end_of_document(LineColumn::new(0, 0))
    }
}

/// Diagnostic severity as seen by the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Compilation cannot produce output.
    Error,
    /// Advisory only.
    Warning,
}

impl DiagnosticSeverity {
    /// Human-readable label (`"Error"` / `"Warning"`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// A single compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source range.
    pub span: Span,
    /// Diagnostic message.
    pub message: String,
    /// Whether this diagnostic is an error (otherwise a warning).
    pub is_error: bool,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_error: true,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_error: false,
        }
    }

    /// Severity derived from [`Diagnostic::is_error`].
    pub fn severity(&self) -> DiagnosticSeverity {
        if self.is_error {
            DiagnosticSeverity::Error
        } else {
            DiagnosticSeverity::Warning
        }
    }
}

/// Formats as the failure list renders it: `Error: <message> (<line>:<column>)`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}:{})",
            self.severity().label(),
            self.message,
            self.span.start.line,
            self.span.start.column
        )
    }
}
