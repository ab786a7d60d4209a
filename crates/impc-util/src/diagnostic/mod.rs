//! Diagnostic collection and reporting.
//!
//! Every stage of the pipeline reports problems through a [`Handler`]
//! rather than returning `Result` directly to its caller: the lexer,
//! parser, and analyzer all stop at the first error (per the error-handling
//! design's no-recovery policy), so in practice a `Handler` only ever ends
//! up holding zero or one diagnostic, but the collection API stays general
//! in case a future caller wants to keep going and gather more than one.

mod builder;
mod level;

pub use builder::DiagnosticBuilder;
pub use level::Level;

use std::cell::RefCell;

use crate::span::Span;

/// A single reported problem: a severity, a message, the span it occurred
/// at, and optional supplementary notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render as `error: message` followed by a `--> line:column` pointer,
    /// matching the CLI's stderr contract.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}: {}\n  --> line {}, column {}",
            self.level, self.message, self.span.line, self.span.column
        );
        for note in &self.notes {
            out.push_str(&format!("\n  note: {note}"));
        }
        out
    }
}

/// Collects diagnostics emitted during one compilation.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn build_error(&self, message: impl Into<String>, span: Span) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder::new(self, Level::Error, message, span)
    }

    pub fn build_bug(&self, message: impl Into<String>, span: Span) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder::new(self, Level::Bug, message, span)
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level.is_error())
    }

    /// The first reported diagnostic, if any. Because every stage stops at
    /// its first error, this is the only one a caller usually needs.
    pub fn first(&self) -> Option<Diagnostic> {
        self.diagnostics.borrow().first().cloned()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn build_error_records_a_diagnostic() {
        let handler = Handler::new();
        handler
            .build_error("unexpected token", Span::point(3, 5))
            .emit();
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics().len(), 1);
    }

    #[test]
    fn render_includes_line_and_column() {
        let diag = Diagnostic::new(Level::Error, "bad stuff", Span::point(7, 2));
        let rendered = diag.render();
        assert!(rendered.contains("error: bad stuff"));
        assert!(rendered.contains("line 7, column 2"));
    }

    #[test]
    fn notes_are_appended() {
        let diag = Diagnostic::new(Level::Error, "mismatch", Span::point(1, 1))
            .with_note("expected i64, found bool");
        assert!(diag.render().contains("note: expected i64, found bool"));
    }

    #[test]
    fn empty_handler_has_no_errors() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert!(handler.first().is_none());
    }
}
