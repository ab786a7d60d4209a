//! Shared foundation types used by every stage of the impc pipeline:
//! source spans, string interning, and diagnostic reporting.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;
