//! Natural-language arithmetic phrasing.
//!
//! Turns spoken or typed sentences such as "what is 12 plus 8" into a plain
//! arithmetic expression. This is a best-effort word substitution, not a
//! grammar: anything it does not recognise is stripped and left for the
//! evaluator to reject.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::evaluation::evaluate_expression;
use crate::error::EvalResult;

/// Where a piece of text came from. Typed questions additionally drop their
/// question preamble ("what is", "calculate").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSource {
    Speech,
    Question,
}

lazy_static! {
    /// "<number> % of <number>", anywhere in the text.
    static ref PERCENT_OF: Regex = Regex::new(
        r"(\d+(?:\.\d+)?)\s*%\s*of\s*(\d+(?:\.\d+)?)"
    ).unwrap();

    static ref QUESTION_PREAMBLE: Regex = Regex::new(
        r"what\s+is\s+|calculate\s+"
    ).unwrap();

    /// Everything outside the characters an expression may contain.
    static ref NON_EXPRESSION_CHARS: Regex = Regex::new(
        r"[^\d\s+\-*/%.()=]"
    ).unwrap();

    /// Word operators, longest phrases first.
    static ref WORD_OPERATORS: Vec<(Regex, &'static str)> = [
        (r"divided\s+by", "/"),
        (r"multiplied\s+by", "*"),
        (r"plus", "+"),
        (r"minus", "-"),
        (r"times", "*"),
        (r"multiply", "*"),
        (r"divide", "/"),
        (r"percent", "%"),
        (r"equals", "="),
    ]
    .into_iter()
    .map(|(pattern, op)| (Regex::new(pattern).unwrap(), op))
    .collect();
}

/// Case-fold and replace operator words with their symbols.
pub fn translate_words(text: &str, source: TextSource) -> String {
    let mut result = text.to_lowercase();

    if source == TextSource::Question {
        result = QUESTION_PREAMBLE.replace_all(&result, "").into_owned();
    }

    for (pattern, op) in WORD_OPERATORS.iter() {
        result = pattern.replace_all(&result, *op).into_owned();
    }

    result
}

/// Compute "A% of B" directly if the text contains that phrase.
pub fn percent_of(text: &str) -> Option<f64> {
    let captures = PERCENT_OF.captures(text)?;
    let percentage: f64 = captures.get(1)?.as_str().parse().ok()?;
    let base: f64 = captures.get(2)?.as_str().parse().ok()?;
    Some(percentage / 100.0 * base)
}

/// Reduce translated text to the expression alphabet and drop `=` separators.
pub fn to_expression(text: &str) -> String {
    NON_EXPRESSION_CHARS
        .replace_all(text, "")
        .replace('=', "")
        .trim()
        .to_string()
}

/// Evaluate free-form text, reporting why it failed.
pub fn try_evaluate(text: &str, source: TextSource) -> EvalResult<f64> {
    let translated = translate_words(text, source);

    if let Some(value) = percent_of(&translated) {
        debug!(input = text, value, "percent-of phrase");
        return Ok(value);
    }

    let expression = to_expression(&translated);
    debug!(input = text, expression = %expression, "normalized expression");
    evaluate_expression(&expression)
}

/// Evaluate free-form text. Any failure collapses to `None`.
pub fn evaluate(text: &str, source: TextSource) -> Option<f64> {
    match try_evaluate(text, source) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(input = text, error = %e, "could not evaluate text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Option<f64> {
        evaluate(text, TextSource::Question)
    }

    fn speech(text: &str) -> Option<f64> {
        evaluate(text, TextSource::Speech)
    }

    #[test]
    fn test_percent_of_phrases() {
        assert_eq!(speech("5 percent of 200"), Some(10.0));
        assert_eq!(question("What is 15% of 80?"), Some(12.0));
        assert_eq!(speech("12.5 %of 40"), Some(5.0));
        assert_eq!(percent_of("no numbers here"), None);
    }

    #[test]
    fn test_question_phrasing() {
        assert_eq!(question("what is 12 plus 8"), Some(20.0));
        assert_eq!(question("Calculate 6 times 7"), Some(42.0));
        assert_eq!(question("what is 100 divided by 8"), Some(12.5));
        assert_eq!(question("what   is 3 multiplied by 3"), Some(9.0));
    }

    #[test]
    fn test_speech_phrasing() {
        assert_eq!(speech("9 minus 4"), Some(5.0));
        assert_eq!(speech("2 plus 3 times 4"), Some(14.0));
        assert_eq!(speech("10 divide 4"), Some(2.5));
        assert_eq!(speech("3 multiply 3 equals"), Some(9.0));
        assert_eq!(speech("(1 plus 2) times 3"), Some(9.0));
    }

    #[test]
    fn test_symbols_pass_through() {
        assert_eq!(question("2+2="), Some(4.0));
        assert_eq!(question("what is (4 - 1) * 2?"), Some(6.0));
    }

    #[test]
    fn test_percent_without_of_is_remainder() {
        assert_eq!(speech("10 percent 3"), Some(1.0));
    }

    #[test]
    fn test_division_by_zero_is_rejected() {
        assert_eq!(speech("10 divided by 0"), None);
        assert_eq!(question("10 / 0"), None);
    }

    #[test]
    fn test_unrecognised_text_fails_closed() {
        assert_eq!(question("banana"), None);
        assert_eq!(speech(""), None);
        assert_eq!(speech("twelve plus eight"), None);
        assert_eq!(question("2 plus plus"), None);
        assert_eq!(speech("1 = 1"), None);
    }

    #[test]
    fn test_deeply_nested_input_fails_closed() {
        assert_eq!(question(&"(".repeat(10_000)), None);
        assert_eq!(
            question(&format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000))),
            None
        );
        assert_eq!(speech(&format!("{}3", "minus ".repeat(5_000))), Some(3.0));
    }

    #[test]
    fn test_to_expression_strips_noise() {
        assert_eq!(to_expression("so, 3 + 4 = ?"), "3 + 4");
        assert_eq!(to_expression("abc"), "");
    }

    #[test]
    fn test_try_evaluate_reports_reason() {
        use crate::error::{EvalError, ParseError};

        assert_eq!(
            try_evaluate("banana", TextSource::Question),
            Err(EvalError::Parse(ParseError::Empty))
        );
        assert!(matches!(
            try_evaluate("1 divided by 0", TextSource::Speech),
            Err(EvalError::NonFinite(_))
        ));
    }
}
