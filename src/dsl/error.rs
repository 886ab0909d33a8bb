//! Diagnostics raised while compiling UIX source.

use std::fmt;

/// A positioned compile failure.
///
/// Parse errors also record the construct the parser was looking for in
/// `expected`, so callers can report it without picking apart `message`.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
    pub expected: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    GenerationError,
}

impl CompileError {
    fn at(kind: ErrorKind, message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind,
            expected: None,
        }
    }

    pub fn lex(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::at(ErrorKind::LexError, message, line, col)
    }

    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::at(ErrorKind::ParseError, message, line, col)
    }

    pub fn generation(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::at(ErrorKind::GenerationError, message, line, col)
    }

    /// Attach the construct that was expected at this position.
    pub fn expecting(mut self, construct: impl Into<String>) -> Self {
        self.expected = Some(construct.into());
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {:?}: {}",
            self.line, self.col, self.kind, self.message
        )
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_kind() {
        let err = CompileError::parse("expected '}', found end of input", 3, 7);
        assert_eq!(
            err.to_string(),
            "[3:7] ParseError: expected '}', found end of input"
        );
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(CompileError::lex("x", 1, 1).kind, ErrorKind::LexError);
        assert_eq!(
            CompileError::generation("x", 1, 1).kind,
            ErrorKind::GenerationError
        );
        assert_eq!(CompileError::parse("x", 1, 1).expected, None);
    }

    #[test]
    fn expected_construct_is_kept_apart_from_message() {
        let err = CompileError::parse("expected table name, found '}'", 2, 4).expecting("table name");
        assert_eq!(err.expected.as_deref(), Some("table name"));
        assert_eq!(err.to_string(), "[2:4] ParseError: expected table name, found '}'");
    }
}
