//! Lexical error taxonomy.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{character}' at line {line}")]
    UnexpectedChar { character: char, line: u32 },

    #[error("malformed number literal at line {line}")]
    MalformedNumber { line: u32 },
}

impl LexError {
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnexpectedChar { line, .. } => *line,
            LexError::MalformedNumber { line, .. } => *line,
        }
    }
}
