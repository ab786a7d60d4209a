//! Fluent construction of a [`super::Diagnostic`] before it is emitted.

use super::{Diagnostic, Handler, Level};
use crate::span::Span;

#[must_use = "a DiagnosticBuilder does nothing until .emit() is called"]
pub struct DiagnosticBuilder<'a> {
    handler: &'a Handler,
    diagnostic: Diagnostic,
}

impl<'a> DiagnosticBuilder<'a> {
    pub(super) fn new(
        handler: &'a Handler,
        level: Level,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            handler,
            diagnostic: Diagnostic::new(level, message, span),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.diagnostic = self.diagnostic.with_note(note);
        self
    }

    pub fn emit(self) {
        self.handler.emit(self.diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::super::Handler;
    use crate::span::Span;

    #[test]
    fn builder_chains_notes_before_emit() {
        let handler = Handler::new();
        handler
            .build_error("arity mismatch", Span::point(4, 1))
            .with_note("expected 2 arguments, found 1")
            .emit();
        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].notes.len(), 1);
    }
}
