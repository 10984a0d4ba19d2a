use std::path::PathBuf;

use thiserror::Error;

use crate::token::Token;
use crate::utils::error::SimpleError;
use crate::utils::metadata::{LineIndex, Location};

/// Error detail - structured error information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorDetail {
    /// Expected token not found (e.g., expected `)` but found `FROM`)
    #[error("Expected {expected}, found `{found}`")]
    UnexpectedToken { expected: String, found: String },
    /// Unexpected end of input
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    /// Valid SQL this parser does not handle
    #[error("Unsupported syntax: {reason}")]
    Unsupported { reason: String },
}

/// Parser error at a source position. End-of-input errors point past the last line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub detail: ErrorDetail,
}

impl ParseError {
    pub fn unexpected_token(token: &Token, expected: &str) -> Self {
        if token.is_eof() {
            return Self::unexpected_eof(expected);
        }
        Self {
            line: token.line,
            column: token.column,
            length: token.literal.len(),
            detail: ErrorDetail::UnexpectedToken {
                expected: expected.to_string(),
                found: token.literal.clone(),
            },
        }
    }

    pub fn unexpected_eof(expected: &str) -> Self {
        Self {
            line: usize::MAX,
            column: usize::MAX,
            length: 0,
            detail: ErrorDetail::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    pub fn unsupported(token: &Token, reason: &str) -> Self {
        Self {
            line: token.line,
            column: token.column,
            length: token.literal.len(),
            detail: ErrorDetail::Unsupported {
                reason: reason.to_string(),
            },
        }
    }

    pub fn into_reportable(self, index: &LineIndex, path: PathBuf) -> SimpleError {
        let start = index.offset(self.line, self.column);
        SimpleError {
            message: self.to_string(),
            span: Location::new(start..start + self.length, path),
        }
    }
}
