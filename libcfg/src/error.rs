//! Error types for configuration parsing and loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Error type for parsing.
///
/// Every variant carries the 1-based line on which the offending byte was read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Lexical or structural problem in the source.
    #[error("syntax error:{line}: {message}")]
    Syntax { line: usize, message: String },

    /// A numeric literal that could not be converted.
    #[error("parsing error:{line}: \"{key}\" setting value is \"{literal}\" {reason}")]
    Number {
        line: usize,
        key: String,
        literal: String,
        reason: String,
    },

    /// Input ended while a key, value, or mode header was still open.
    #[error("syntax error:{line}: invalid configuration. probably cause \"{key}\" parameters")]
    Incomplete { line: usize, key: String },
}

impl ParseError {
    /// The 1-based source line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::Number { line, .. }
            | ParseError::Incomplete { line, .. } => *line,
        }
    }
}

/// A recognizer failure that has not been placed in the source yet.
///
/// Recognizers only know the key and the literal they are looking at; the
/// document engine knows the line. [`Fault::at`] joins the two.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fault {
    Syntax(String),
    Number { literal: String, reason: String },
}

impl Fault {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Fault::Syntax(message.into())
    }

    pub(crate) fn number(literal: impl Into<String>, reason: impl ToString) -> Self {
        Fault::Number {
            literal: literal.into(),
            reason: reason.to_string(),
        }
    }

    /// Attach a 0-based line number and the active key.
    pub(crate) fn at(self, line: usize, key: &str) -> ParseError {
        match self {
            Fault::Syntax(message) => ParseError::Syntax {
                line: line + 1,
                message,
            },
            Fault::Number { literal, reason } => ParseError::Number {
                line: line + 1,
                key: key.to_string(),
                literal,
                reason,
            },
        }
    }
}

/// Error type for loading, merging, and decoding configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Neither the catch-all section nor the requested mode exist.
    #[error("no configuration")]
    NoConfiguration,

    /// The tree does not fit the requested record type.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
