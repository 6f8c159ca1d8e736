//! Application context.
//!
//! Owns the single keypad state together with the selected input mode and the
//! status lines shown next to the voice and text inputs. Every UI handler goes
//! through this context; results computed from voice or text input are pushed
//! into the keypad's display slot.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculator::{
    DisplayFormat, Keypad, KeypadEvent, TextSource, evaluate, format_number, format_value,
    to_stored,
};
use crate::input::{SpeechEvent, SpeechRecognizer, VoiceSession, key_event};

/// Message shown when a spoken phrase cannot be evaluated.
pub const SPEECH_FAILURE: &str = "Could not understand calculation";
/// Message shown when a typed question cannot be evaluated.
pub const QUESTION_FAILURE: &str = "Could not calculate the result";

/// The active input mode. Only the matching input is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Voice,
    Text,
    Keypad,
}

/// The two display lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Screen {
    /// Pending left operand and operator, e.g. `12 ×`. Empty when nothing is
    /// pending.
    pub previous: String,
    /// The operand being typed or the last result.
    pub current: String,
}

pub struct App<R: SpeechRecognizer> {
    keypad: Keypad,
    mode: Mode,
    format: DisplayFormat,
    voice: VoiceSession<R>,
    answer: String,
}

impl<R: SpeechRecognizer> App<R> {
    pub fn new(mode: Mode, format: DisplayFormat, recognizer: Option<R>) -> Self {
        Self {
            keypad: Keypad::new(),
            mode,
            format,
            voice: VoiceSession::new(recognizer),
            answer: String::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn voice(&self) -> &VoiceSession<R> {
        &self.voice
    }

    /// The answer line below the text input.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Switch input mode. The keypad is reset and the status lines of the
    /// inputs that become disabled are cleared.
    pub fn set_mode(&mut self, mode: Mode) {
        info!(from = ?self.mode, to = ?mode, "switching mode");

        self.keypad.clear();
        if self.voice.is_listening() && mode != Mode::Voice {
            self.voice.stop();
        }

        match mode {
            Mode::Voice => self.answer.clear(),
            Mode::Text => self.voice.set_transcript(""),
            Mode::Keypad => {
                self.voice.set_transcript("");
                self.answer.clear();
            }
        }

        self.mode = mode;
    }

    /// Handle a keypad button press. Buttons are disabled outside keypad mode.
    pub fn press(&mut self, event: KeypadEvent) {
        if self.mode != Mode::Keypad {
            debug!(?event, "keypad disabled in {:?} mode", self.mode);
            return;
        }
        self.keypad.handle(event);
    }

    /// Handle a keyboard key. Returns `true` if the key was consumed.
    pub fn key(&mut self, key: &str) -> bool {
        if self.mode != Mode::Keypad {
            return false;
        }
        match key_event(key) {
            Some(event) => {
                self.keypad.handle(event);
                true
            }
            None => false,
        }
    }

    /// Start or stop voice capture. Only available in voice mode.
    pub fn toggle_voice(&mut self) {
        if self.mode == Mode::Voice {
            self.voice.toggle();
        }
    }

    /// Forward a recognizer callback. A completed transcript is evaluated
    /// right away.
    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        if let Some(transcript) = self.voice.on_event(event) {
            self.accept_transcript(&transcript);
        }
    }

    /// Evaluate a final speech transcript and show the outcome in the voice
    /// status line. Returns the computed value.
    pub fn accept_transcript(&mut self, transcript: &str) -> Option<f64> {
        let transcript = transcript.trim();
        self.voice.set_transcript(transcript);

        let result = evaluate(transcript, TextSource::Speech);
        let status = self.deliver(result, SPEECH_FAILURE);
        self.voice.set_status(status);
        result
    }

    /// Evaluate a typed question. Blank questions and questions submitted
    /// outside text mode are ignored.
    pub fn submit_question(&mut self, question: &str) -> Option<f64> {
        let question = question.trim();
        if self.mode != Mode::Text || question.is_empty() {
            return None;
        }

        let result = evaluate(question, TextSource::Question);
        self.answer = self.deliver(result, QUESTION_FAILURE);
        result
    }

    /// Push a computed value into the keypad and build the confirmation or
    /// failure message.
    fn deliver(&mut self, result: Option<f64>, failure: &str) -> String {
        match result {
            Some(value) => {
                self.keypad.apply_external_result(value);
                format!("Answer: {}", to_stored(value))
            }
            None => failure.to_string(),
        }
    }

    /// Render the display lines. Does not touch state.
    pub fn screen(&self) -> Screen {
        let previous = match (self.keypad.previous(), self.keypad.operator()) {
            (Some(previous), Some(op)) => {
                format!("{} {}", format_value(previous, &self.format), op.symbol())
            }
            _ => String::new(),
        };

        Screen {
            previous,
            current: format_number(self.keypad.current(), &self.format),
        }
    }
}
