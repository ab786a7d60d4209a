//! Error types for LLVM IR generation.
//!
//! The generator runs on an already-analyzed program, so every condition
//! here is an invariant violation rather than a user-facing mistake — the
//! fourth kind in the pipeline's error taxonomy. A well-formed program that
//! passed semantic analysis can never trigger one; if it does, it's a
//! compiler bug, not a bad input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
