//! Calculator core.
//!
//! This module provides:
//! - The keypad state machine driven by button and key events
//! - Number formatting for the display
//! - Evaluation of spoken or typed arithmetic phrases

mod display;
mod evaluation;
mod keypad;
mod phrases;

pub use display::{DisplayFormat, format_number, format_value, parse_operand, to_stored};
pub use evaluation::evaluate_expression;
pub use keypad::{Keypad, KeypadEvent, Operator, Phase};
pub use phrases::{TextSource, evaluate, percent_of, to_expression, translate_words, try_evaluate};
