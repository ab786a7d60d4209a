//! Semantic error taxonomy.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("undeclared name '{name}' at line {line}")]
    UndeclaredName { name: String, line: u32 },

    #[error("'{name}' is already declared in this scope, at line {line}")]
    DuplicateName { name: String, line: u32 },

    #[error("struct '{name}' is declared more than once, at line {line}")]
    DuplicateStruct { name: String, line: u32 },

    #[error("duplicate field '{field}' in struct '{name}', at line {line}")]
    DuplicateField {
        name: String,
        field: String,
        line: u32,
    },

    #[error("field '{field}' of struct '{name}' has unknown type, at line {line}")]
    UnknownFieldType {
        name: String,
        field: String,
        line: u32,
    },

    #[error("type mismatch at line {line}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("cannot assign to immutable variable '{name}', at line {line}")]
    ImmutableAssignment { name: String, line: u32 },

    #[error("cannot assign through immutable field '{field}', at line {line}")]
    ImmutableField { field: String, line: u32 },

    #[error(
        "function '{name}' expects {expected} argument(s), found {found}, at line {line}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        line: u32,
    },

    #[error("no field or method '{name}' on this type, at line {line}")]
    FieldNotFound { name: String, line: u32 },

    #[error("undeclared function '{name}', at line {line}")]
    UndeclaredFunction { name: String, line: u32 },

    #[error("if condition must be bool, at line {line}")]
    NonBooleanCondition { line: u32 },

    #[error("self-assignment '{name} = {name}', at line {line}")]
    SelfAssignment { name: String, line: u32 },

    #[error("use of '{name}' before its declaration finishes initializing, at line {line}")]
    UseWhileInitializing { name: String, line: u32 },

    #[error("function '{name}' has no return statement")]
    MissingReturn { name: String },

    #[error("program has no top-level return statement")]
    MissingTopLevelReturn,

    #[error("top-level return must be an integer or bool, found {found}")]
    InvalidTopLevelReturn { found: String },

    #[error("internal compiler error: {0}")]
    Internal(String),
}

impl SemanticError {
    /// Best-effort source line for the CLI's `error: ... at line N` report.
    /// A handful of whole-program errors have no single offending line.
    pub fn line(&self) -> Option<u32> {
        match self {
            SemanticError::UndeclaredName { line, .. }
            | SemanticError::DuplicateName { line, .. }
            | SemanticError::DuplicateStruct { line, .. }
            | SemanticError::DuplicateField { line, .. }
            | SemanticError::UnknownFieldType { line, .. }
            | SemanticError::TypeMismatch { line, .. }
            | SemanticError::ImmutableAssignment { line, .. }
            | SemanticError::ImmutableField { line, .. }
            | SemanticError::ArityMismatch { line, .. }
            | SemanticError::FieldNotFound { line, .. }
            | SemanticError::UndeclaredFunction { line, .. }
            | SemanticError::NonBooleanCondition { line }
            | SemanticError::SelfAssignment { line, .. }
            | SemanticError::UseWhileInitializing { line, .. } => Some(*line),
            SemanticError::MissingReturn { .. }
            | SemanticError::MissingTopLevelReturn
            | SemanticError::InvalidTopLevelReturn { .. }
            | SemanticError::Internal(_) => None,
        }
    }
}
