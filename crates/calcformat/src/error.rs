//! Error types for the calcformat facade

use calcformat_core::ErrorKind;
use calcformat_formula::FormulaError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while computing, formatting or grading an answer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid answer configuration
    #[error(transparent)]
    Config(#[from] calcformat_core::Error),

    /// Formula rejected by validation or evaluation
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Locale separators that cannot form a numeral grammar
    #[error("Invalid numeral grammar: {0}")]
    Grammar(#[from] regex::Error),

    /// Learner response that is not a number in the expected format
    #[error("Cannot read '{0}' as a number")]
    Unparseable(String),
}

impl Error {
    /// The coarse classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(e) => e.kind(),
            Error::Formula(e) => e.kind(),
            Error::Grammar(_) => ErrorKind::IllegalSyntax,
            Error::Unparseable(_) => ErrorKind::Unparseable,
        }
    }
}
