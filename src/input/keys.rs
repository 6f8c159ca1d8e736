//! Mapping of raw button and keyboard input onto keypad events.

use crate::calculator::{KeypadEvent, Operator};

/// A keypad button as described by the UI: either an action or a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Button {
    /// `clear`, `delete` or `equals`.
    Action(String),
    /// A digit, `.` or an operator character.
    Value(String),
}

impl Button {
    /// Resolve the button to an event. Unknown actions and values yield
    /// `None`.
    pub fn to_event(&self) -> Option<KeypadEvent> {
        match self {
            Self::Action(action) => match action.as_str() {
                "clear" => Some(KeypadEvent::Clear),
                "delete" => Some(KeypadEvent::Delete),
                "equals" => Some(KeypadEvent::Equals),
                _ => None,
            },
            Self::Value(value) => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => char_event(c),
                    _ => None,
                }
            }
        }
    }
}

/// Map a keyboard key name (as reported by the UI toolkit) to an event.
///
/// Digits, `.`, and `+ - * / %` map to themselves; `Enter` and `=` resolve,
/// `Escape` clears, `Backspace` deletes. Everything else is ignored.
pub fn key_event(key: &str) -> Option<KeypadEvent> {
    match key {
        "Enter" | "=" => Some(KeypadEvent::Equals),
        "Escape" => Some(KeypadEvent::Clear),
        "Backspace" => Some(KeypadEvent::Delete),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => char_event(c),
                _ => None,
            }
        }
    }
}

fn char_event(c: char) -> Option<KeypadEvent> {
    match c {
        '0'..='9' => c.to_digit(10).map(|d| KeypadEvent::Digit(d as u8)),
        '.' => Some(KeypadEvent::Decimal),
        other => Operator::from_char(other).map(KeypadEvent::Operator),
    }
}

/// Split a compact key sequence such as `12+3=` or `9 Backspace 4 Enter`
/// into key names. Named keys are separated by whitespace, everything else is
/// one key per character.
pub fn split_sequence(sequence: &str) -> Vec<String> {
    let mut keys = Vec::new();

    for word in sequence.split_whitespace() {
        if key_event(word).is_some() && word.chars().count() > 1 {
            keys.push(word.to_string());
        } else {
            keys.extend(word.chars().map(String::from));
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_event("7"), Some(KeypadEvent::Digit(7)));
        assert_eq!(key_event("."), Some(KeypadEvent::Decimal));
        assert_eq!(
            key_event("%"),
            Some(KeypadEvent::Operator(Operator::Remainder))
        );
        assert_eq!(key_event("Enter"), Some(KeypadEvent::Equals));
        assert_eq!(key_event("="), Some(KeypadEvent::Equals));
        assert_eq!(key_event("Escape"), Some(KeypadEvent::Clear));
        assert_eq!(key_event("Backspace"), Some(KeypadEvent::Delete));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        assert_eq!(key_event("a"), None);
        assert_eq!(key_event("Shift"), None);
        assert_eq!(key_event("12"), None);
        assert_eq!(key_event(""), None);
    }

    #[test]
    fn test_buttons() {
        assert_eq!(
            Button::Action("clear".into()).to_event(),
            Some(KeypadEvent::Clear)
        );
        assert_eq!(
            Button::Value("/".into()).to_event(),
            Some(KeypadEvent::Operator(Operator::Divide))
        );
        assert_eq!(Button::Value("0".into()).to_event(), Some(KeypadEvent::Digit(0)));
        assert_eq!(Button::Action("theme".into()).to_event(), None);
        assert_eq!(Button::Value("=".into()).to_event(), None);
    }

    #[test]
    fn test_split_sequence() {
        assert_eq!(split_sequence("12+3="), vec!["1", "2", "+", "3", "="]);
        assert_eq!(
            split_sequence("9 Backspace 4 Enter"),
            vec!["9", "Backspace", "4", "Enter"]
        );
    }
}
