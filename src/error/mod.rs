//! Error handling and diagnostics for the Pyrite compiler
//!
//! Every stage of the pipeline fails fast: the first error aborts the whole
//! compilation and is surfaced to the caller unmodified.

use std::fmt;

use thiserror::Error;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for Pyrite operations
pub type PyriteResult<T> = Result<T, PyriteError>;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}:{}:{}", filename, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Main error type for the Pyrite compiler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PyriteError {
    /// Bad indentation width, inconsistent dedent, or text no lexical rule matches
    #[error("Lexical Error: {message} at {location}")]
    LexicalError {
        message: String,
        location: SourceLocation,
    },
    /// Token does not fit the grammar
    #[error("Syntactic Error: {message} at {location}")]
    SyntacticError {
        message: String,
        location: SourceLocation,
    },
    /// Undefined call target or wrong number of arguments
    #[error("Semantic Error: {message}")]
    SemanticError { message: String, identifier: String },
    /// Reading the source or writing the output failed
    #[error("I/O Error: {message}")]
    IoError { message: String },
}

impl PyriteError {
    /// Create a new lexical error
    pub fn lexical_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::LexicalError {
            message: message.into(),
            location,
        }
    }

    /// Create a new syntactic error
    pub fn syntactic_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::SyntacticError {
            message: message.into(),
            location,
        }
    }

    /// Create a new semantic error naming the offending identifier
    pub fn semantic_error(message: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::SemanticError {
            message: message.into(),
            identifier: identifier.into(),
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::LexicalError { .. } => "Lexical Error",
            Self::SyntacticError { .. } => "Syntactic Error",
            Self::SemanticError { .. } => "Semantic Error",
            Self::IoError { .. } => "I/O Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::LexicalError { message, .. }
            | Self::SyntacticError { message, .. }
            | Self::SemanticError { message, .. }
            | Self::IoError { message } => message,
        }
    }

    /// Get the source location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::LexicalError { location, .. } | Self::SyntacticError { location, .. } => {
                Some(location)
            }
            Self::SemanticError { .. } | Self::IoError { .. } => None,
        }
    }

    /// Line of the first offending token, for lexical and syntactic errors
    pub fn line(&self) -> Option<usize> {
        self.location().map(|location| location.line)
    }
}

impl From<std::io::Error> for PyriteError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}
