//! Voice capture session.
//!
//! The recognizer itself lives outside this crate. It is driven through the
//! [`SpeechRecognizer`] trait and reports back through [`SpeechEvent`]s. Only
//! final transcripts are handed on for evaluation; interim text is kept for
//! display.

use tracing::{debug, info, warn};

use crate::error::SpeechError;

/// Status shown when no recognizer is available.
pub const UNSUPPORTED_STATUS: &str = "Speech recognition not supported";

/// A speech-to-text provider.
pub trait SpeechRecognizer {
    /// Begin capturing audio. Results arrive later as [`SpeechEvent`]s.
    fn start(&mut self) -> Result<(), SpeechError>;

    /// Stop capturing and release the capture handle. Must be safe to call
    /// at any time, including when already stopped.
    fn stop(&mut self);
}

/// One piece of a recognition result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Callbacks from the recognizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Results(Vec<TranscriptSegment>),
    Error(String),
    Ended,
}

/// Tracks listening state, transcript display and status line for one
/// recognizer.
pub struct VoiceSession<R: SpeechRecognizer> {
    recognizer: Option<R>,
    listening: bool,
    transcript: String,
    status: String,
}

impl<R: SpeechRecognizer> VoiceSession<R> {
    /// Create a session. `None` means the environment has no speech support.
    pub fn new(recognizer: Option<R>) -> Self {
        let status = if recognizer.is_none() {
            warn!("speech recognition unavailable");
            UNSUPPORTED_STATUS.to_string()
        } else {
            String::new()
        };

        Self {
            recognizer,
            listening: false,
            transcript: String::new(),
            status,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Transcript text shown to the user (final plus interim).
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replace the status line, e.g. with the evaluation outcome.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Replace the displayed transcript.
    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.transcript = transcript.into();
    }

    /// Start listening when idle, stop when listening.
    pub fn toggle(&mut self) {
        if self.listening {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        if self.listening {
            return;
        }
        let Some(recognizer) = self.recognizer.as_mut() else {
            return;
        };

        if let Err(e) = recognizer.start() {
            warn!(error = %e, "failed to start speech recognition");
            self.status = format!("Error: {}", e);
        }
    }

    /// Stop listening. Any transcript still in flight is abandoned.
    pub fn stop(&mut self) {
        self.listening = false;
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
            self.status.clear();
        }
    }

    /// Process a recognizer callback. Returns the final transcript, trimmed,
    /// when one is complete and should be evaluated.
    pub fn on_event(&mut self, event: SpeechEvent) -> Option<String> {
        match event {
            SpeechEvent::Started => {
                info!("listening");
                self.listening = true;
                self.status = "Listening...".to_string();
                self.transcript.clear();
                None
            }
            SpeechEvent::Results(segments) => {
                if !self.listening {
                    debug!("dropping results received while stopped");
                    return None;
                }

                let (finals, interims): (Vec<_>, Vec<_>) =
                    segments.into_iter().partition(|s| s.is_final);
                let final_text: String = finals.into_iter().map(|s| s.text).collect();
                let interim_text: String = interims.into_iter().map(|s| s.text).collect();

                self.transcript = format!("{}{}", final_text, interim_text);

                let final_text = final_text.trim();
                if final_text.is_empty() {
                    return None;
                }

                self.status = "Processing...".to_string();
                self.transcript = final_text.to_string();
                Some(final_text.to_string())
            }
            SpeechEvent::Error(message) => {
                warn!(error = %message, "speech recognition error");
                self.stop();
                self.status = format!("Error: {}", message);
                None
            }
            SpeechEvent::Ended => {
                debug!("speech recognition ended");
                self.stop();
                None
            }
        }
    }
}
