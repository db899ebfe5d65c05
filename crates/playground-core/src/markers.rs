//! Diagnostic → editor marker projection.
//!
//! The editor consumes a flat list of [`Marker`]s and replaces its previous set wholesale on
//! every compile cycle. The mapping here is pure and total: it never panics, and the same input
//! always yields the same output, so re-rendering is deterministic.
//!
//! Coordinate rules:
//! - lines pass through (both sides are 1-based), clamped to the current document;
//! - columns gain one (`0`-based compiler columns → `1`-based editor columns);
//! - a missing span end becomes `(line_count + 1, 0)`, i.e. "to the end of the document".

use crate::diagnostics::{Diagnostic, LineColumn};
use crate::source::SourceText;
use serde::{Deserialize, Serialize};

/// Marker severity understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerSeverity {
    /// Error marker.
    Error,
    /// Warning marker.
    Warning,
}

impl MarkerSeverity {
    /// The editor's numeric severity value (`Error = 8`, `Warning = 4`).
    pub fn monaco_value(self) -> u8 {
        match self {
            Self::Error => 8,
            Self::Warning => 4,
        }
    }
}

/// An editor-native annotation over a range of source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Start line (1-based).
    pub start_line_number: usize,
    /// Start column (1-based).
    pub start_column: usize,
    /// End line (1-based; `line_count + 1` for open-ended spans).
    pub end_line_number: usize,
    /// End column (1-based; `0` for open-ended spans).
    pub end_column: usize,
    /// Diagnostic message.
    pub message: String,
    /// Marker severity.
    pub severity: MarkerSeverity,
}

/// Unit in which the editor addresses columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnUnits {
    /// Unicode scalar values, exactly as the compiler reports them.
    #[default]
    Chars,
    /// UTF-16 code units, computed from the current line text.
    Utf16,
}

/// Options for [`to_markers_in`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerOptions {
    /// Column units expected by the editor.
    pub column_units: ColumnUnits,
}

/// Project diagnostics onto editor markers for a document with `document_line_count` lines.
///
/// `document_line_count` must be the count of the document as it is *now*: the document may have
/// shrunk since the diagnostics were produced, and explicit lines are clamped to it.
pub fn to_markers(diagnostics: &[Diagnostic], document_line_count: usize) -> Vec<Marker> {
    diagnostics
        .iter()
        .map(|diag| marker_for(diag, document_line_count, |_, column| column))
        .collect()
}

/// Like [`to_markers`], reading the line count (and line text, for UTF-16 columns) from `source`.
pub fn to_markers_in(
    diagnostics: &[Diagnostic],
    source: &SourceText,
    options: MarkerOptions,
) -> Vec<Marker> {
    let line_count = source.line_count();
    match options.column_units {
        ColumnUnits::Chars => to_markers(diagnostics, line_count),
        ColumnUnits::Utf16 => diagnostics
            .iter()
            .map(|diag| {
                marker_for(diag, line_count, |line, column| {
                    source.utf16_column(line, column).unwrap_or(column)
                })
            })
            .collect(),
    }
}

fn marker_for(
    diag: &Diagnostic,
    line_count: usize,
    column_of: impl Fn(usize, usize) -> usize,
) -> Marker {
    let last_line = line_count.max(1);
    let clamp = |pos: LineColumn| LineColumn::new(pos.line.min(last_line), pos.column);

    let start = clamp(diag.span.start);
    let (start_line_number, start_column, end_line_number, end_column) = match diag.span.end {
        Some(end) => {
            let end = clamp(end);
            let (start, end) = if end < start { (end, start) } else { (start, end) };
            (
                start.line,
                column_of(start.line, start.column).saturating_add(1),
                end.line,
                column_of(end.line, end.column).saturating_add(1),
            )
        }
        None => (
            start.line,
            column_of(start.line, start.column).saturating_add(1),
            line_count.saturating_add(1),
            0,
        ),
    };

    Marker {
        start_line_number,
        start_column,
        end_line_number,
        end_column,
        message: diag.message.clone(),
        severity: if diag.is_error {
            MarkerSeverity::Error
        } else {
            MarkerSeverity::Warning
        },
    }
}
