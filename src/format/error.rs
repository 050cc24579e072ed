//! Error types for decimal pattern formatting and parsing

use thiserror::Error;

/// Result type for number formatting operations
pub type NumberFormatResult<T> = Result<T, NumberFormatError>;

/// Errors raised while compiling patterns, resolving locales or parsing numbers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumberFormatError {
    /// Pattern does not follow the decimal pattern grammar
    #[error("Malformed pattern \"{pattern}\" at position {position}: {message}")]
    MalformedPattern {
        /// Pattern text
        pattern: String,
        /// Character index of the offending character
        position: usize,
        /// What is wrong with the pattern
        message: String,
    },

    /// Source text does not match the pattern
    #[error("Unparseable number: \"{text}\" (error at position {position})")]
    Unparseable {
        /// Source text
        text: String,
        /// Character index where matching failed
        position: usize,
    },

    /// Locale tag could not be understood
    #[error("Invalid locale tag \"{tag}\"")]
    InvalidLocale {
        /// Offending tag
        tag: String,
    },
}

impl NumberFormatError {
    pub(crate) fn malformed(pattern: &str, position: usize, message: impl Into<String>) -> Self {
        NumberFormatError::MalformedPattern {
            pattern: pattern.to_string(),
            position,
            message: message.into(),
        }
    }

    /// Character position carried by the error, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            NumberFormatError::MalformedPattern { position, .. }
            | NumberFormatError::Unparseable { position, .. } => Some(*position),
            NumberFormatError::InvalidLocale { .. } => None,
        }
    }
}
