//! Diagnostic severity levels.

use std::fmt;

/// Severity of a [`super::Diagnostic`].
///
/// `Bug` is reserved for the fourth error-taxonomy kind: violated internal
/// invariants that should never occur for a well-formed program and
/// indicate a compiler bug rather than a malformed-input rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warning,
    Note,
    Help,
    Bug,
}

impl Level {
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error | Level::Bug)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Help => "help",
            Level::Bug => "internal compiler error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_error_and_bug_count_as_errors() {
        assert!(Level::Error.is_error());
        assert!(Level::Bug.is_error());
        assert!(!Level::Warning.is_error());
        assert!(!Level::Note.is_error());
        assert!(!Level::Help.is_error());
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Level::Error.to_string(), "error");
        assert_eq!(Level::Bug.to_string(), "internal compiler error");
    }
}
