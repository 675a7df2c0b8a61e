//! Error types for the QuillDB engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuillError>;

#[derive(Error, Debug)]
pub enum QuillError {
    /// Lexer or parser failure, positioned at the offending token
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QuillError {
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        QuillError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// True for the reference family (unknown table or column)
    pub fn is_reference_error(&self) -> bool {
        matches!(self, QuillError::TableNotFound(_) | QuillError::ColumnNotFound(_))
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        QuillError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_carries_position() {
        let err = QuillError::syntax("Unexpected character '#'", 2, 7);
        assert_eq!(
            err.to_string(),
            "Syntax error at line 2, column 7: Unexpected character '#'"
        );
    }

    #[test]
    fn test_reference_family() {
        assert!(QuillError::TableNotFound("t".into()).is_reference_error());
        assert!(QuillError::ColumnNotFound("c".into()).is_reference_error());
        assert!(!QuillError::Schema("x".into()).is_reference_error());
    }
}
