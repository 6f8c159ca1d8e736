//! tricalc: a calculator driven by a keypad, speech transcripts or free-text
//! questions.

pub mod app;
pub mod calculator;
pub mod config;
pub mod error;
pub mod input;

pub use app::{App, Mode, Screen};
pub use config::Config;
pub use error::{EvalError, ParseError, SpeechError};
