//! Input sources feeding the calculator: keypad buttons, keyboard keys and
//! speech recognition.

mod keys;
mod speech;

pub use keys::{Button, key_event, split_sequence};
pub use speech::{
    SpeechEvent, SpeechRecognizer, TranscriptSegment, UNSUPPORTED_STATUS, VoiceSession,
};
