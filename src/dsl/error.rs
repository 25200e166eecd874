//! Error types for the city DSL compiler.

use thiserror::Error;

/// An error that occurred while compiling a city script.
#[derive(Debug, Clone, Error)]
#[error("[{line}:{col}] {kind:?}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No token matches the input at this position.
    Lex,
    /// The token stream does not match the grammar.
    Parse,
    /// Grammatical input that cannot be evaluated (undeclared variable, missing element).
    Semantic,
    /// Reading the script or writing the document failed.
    Io,
}

impl CompileError {
    pub fn lex(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::Lex,
        }
    }

    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::Parse,
        }
    }

    pub fn semantic(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::Semantic,
        }
    }

    /// I/O failures have no source position.
    pub fn io(err: std::io::Error) -> Self {
        Self {
            message: err.to_string(),
            line: 0,
            col: 0,
            kind: ErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err)
    }
}
