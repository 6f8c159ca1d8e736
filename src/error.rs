//! Error types shared by the expression interpreter and the speech session.

use thiserror::Error;

/// Why a piece of text could not be reduced to a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The text does not form a valid arithmetic expression.
    #[error("could not parse expression: {0}")]
    Parse(#[from] ParseError),

    /// The expression parsed but its value is NaN or infinite.
    #[error("result is not a finite number ({0})")]
    NonFinite(f64),
}

/// Syntax errors reported by the tokenizer and parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("nothing to evaluate")]
    Empty,

    #[error("unexpected character '{found}' at position {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("malformed number '{text}' at position {pos}")]
    InvalidNumber { pos: usize, text: String },

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { pos: usize, found: String },

    #[error("expression ended too early")]
    UnexpectedEnd,

    #[error("missing ')' for '(' at position {open}")]
    UnclosedParen { open: usize },

    #[error("parentheses nested too deeply at position {pos}")]
    TooDeep { pos: usize },
}

/// Failures of the speech capture provider. These are reported as status
/// text and never reach the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("{0}")]
    Capture(String),
}

impl SpeechError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
