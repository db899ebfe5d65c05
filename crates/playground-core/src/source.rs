//! Immutable source text snapshots.
//!
//! Every edit in the playground produces a fresh [`SourceText`]; the core never keeps history.
//! The snapshot is backed by a [`Rope`], so cloning is cheap and line access is O(log N).
//!
//! Only `\n` separates lines (ropey is built without `unicode_lines`/`cr_lines`), which matches
//! how the editor counts lines: `N` newlines produce `N + 1` lines, so an empty document has one
//! line and `"a\n"` has two.

use ropey::Rope;
use std::borrow::Cow;
use std::fmt;

/// An immutable snapshot of the user's current program.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    rope: Rope,
}

impl SourceText {
    /// Build a snapshot from text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Number of lines in the snapshot (always at least 1).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Number of Unicode scalar values in the snapshot.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of UTF-8 bytes in the snapshot.
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Whether the snapshot is the empty string.
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Borrow the text when it is stored contiguously, otherwise materialize it.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self.rope.slice(..).as_str() {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(self.rope.to_string()),
        }
    }

    /// Text of a 1-based line, without its trailing `\n`.
    ///
    /// Returns `None` for line `0` and for lines past the end of the document.
    pub fn line(&self, line: usize) -> Option<String> {
        if line == 0 || line > self.line_count() {
            return None;
        }
        let slice = self.rope.line(line - 1);
        let mut text = slice.to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Convert a 0-based character column on a 1-based line into UTF-16 code units.
    ///
    /// Columns past the end of the line count one code unit per missing character. Returns
    /// `None` when the line does not exist in this snapshot.
    pub fn utf16_column(&self, line: usize, char_column: usize) -> Option<usize> {
        if line == 0 || line > self.line_count() {
            return None;
        }
        let slice = self.rope.line(line - 1);
        let mut units = 0usize;
        let mut taken = 0usize;
        for ch in slice.chars().take(char_column) {
            if ch == '\n' {
                break;
            }
            units += ch.len_utf16();
            taken += 1;
        }
        Some(units + char_column.saturating_sub(taken))
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceText")
            .field("line_count", &self.line_count())
            .field("char_count", &self.char_count())
            .finish()
    }
}
