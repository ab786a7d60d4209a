//! A single-file source map: content plus precomputed line start offsets.
//!
//! The compiler only ever has one source file open at a time (programs are
//! a single translation unit per §1), but keeping a `SourceMap` rather than
//! a bare `String` means diagnostics can resolve a byte offset back to a
//! line/column and a line of text without the lexer having to carry that
//! logic itself.

use std::sync::Arc;

use super::{FileId, Span};

/// One loaded source file.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: String,
    content: Arc<str>,
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    pub fn new(id: usize, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            id: FileId(id),
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        starts.into()
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of the given 1-based line number, without its trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.content.len());
        self.content.get(start..end)
    }

    /// Resolve a byte offset to its 1-based (line, column).
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = self.content[line_start..offset].chars().count() + 1;
        (line_idx as u32 + 1, column as u32)
    }
}

/// Owns the one source file active for a compilation and can resolve spans
/// back to line text for diagnostic rendering.
#[derive(Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = self.files.len();
        let file = SourceFile::new(id, name, content);
        let file_id = file.id();
        self.files.push(file);
        file_id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// The line of source text a span points at, for a diagnostic's
    /// rendered snippet.
    pub fn line_for_span(&self, span: Span) -> Option<&str> {
        self.get(span.file_id)?.line_text(span.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_returns_requested_line() {
        let file = SourceFile::new(0, "in.imp", "i32 a{1}\ni32 b{2}\nreturn a");
        assert_eq!(file.line_text(1), Some("i32 a{1}"));
        assert_eq!(file.line_text(2), Some("i32 b{2}"));
        assert_eq!(file.line_text(3), Some("return a"));
        assert_eq!(file.line_text(4), None);
    }

    #[test]
    fn line_col_resolves_offsets() {
        let file = SourceFile::new(0, "in.imp", "ab\ncd");
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(3), (2, 1));
        assert_eq!(file.line_col(4), (2, 2));
    }

    #[test]
    fn source_map_tracks_multiple_adds() {
        let mut map = SourceMap::new();
        let id = map.add_file("in.imp", "return 0");
        assert_eq!(map.get(id).unwrap().content(), "return 0");
    }
}
