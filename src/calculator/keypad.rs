//! Keypad state machine.
//!
//! Tracks the operand being typed, the stored left operand and the pending
//! operator. Chained operators resolve strictly left to right, there is no
//! precedence between keypad operations.

use tracing::debug;

use super::display::{parse_operand, to_stored};

/// A binary operator available on the keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl Operator {
    /// Map an operator character (`+ - * / %`) to an operator.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '%' => Some(Self::Remainder),
            _ => None,
        }
    }

    /// Symbol shown next to the stored operand.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "−",
            Self::Multiply => "×",
            Self::Divide => "÷",
            Self::Remainder => "%",
        }
    }

    /// Resolve `lhs op rhs` with keypad semantics.
    ///
    /// Division by zero yields 0 and remainder follows the sign of the
    /// dividend.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide => {
                if rhs != 0.0 {
                    lhs / rhs
                } else {
                    0.0
                }
            }
            Self::Remainder => lhs % rhs,
        }
    }
}

/// A discrete input produced by a button or a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeypadEvent {
    /// A digit `0..=9`.
    Digit(u8),
    Decimal,
    Operator(Operator),
    Clear,
    Delete,
    Equals,
}

/// Coarse phase of the keypad, derived from the two flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Normal entry.
    Idle,
    /// An operator was pressed, the next digit starts the right operand.
    AwaitingOperand,
    /// A result is shown, the next digit starts a fresh number.
    ResultShown,
}

/// Keypad state.
#[derive(Clone, Debug, PartialEq)]
pub struct Keypad {
    current: String,
    previous: Option<f64>,
    operator: Option<Operator>,
    waiting_for_new_number: bool,
    should_reset_display: bool,
}

impl Default for Keypad {
    fn default() -> Self {
        Self {
            current: "0".to_string(),
            previous: None,
            operator: None,
            waiting_for_new_number: false,
            should_reset_display: false,
        }
    }
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// The operand text currently on the display.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The stored left operand, if any.
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn phase(&self) -> Phase {
        if self.should_reset_display {
            Phase::ResultShown
        } else if self.waiting_for_new_number {
            Phase::AwaitingOperand
        } else {
            Phase::Idle
        }
    }

    /// Dispatch a single input event.
    pub fn handle(&mut self, event: KeypadEvent) {
        match event {
            KeypadEvent::Digit(d) => self.input_digit(d),
            KeypadEvent::Decimal => self.input_decimal(),
            KeypadEvent::Operator(op) => self.input_operator(op),
            KeypadEvent::Clear => self.clear(),
            KeypadEvent::Delete => self.delete_last(),
            KeypadEvent::Equals => self.equals(),
        }
    }

    /// Append a digit. Digits above 9 are ignored.
    pub fn input_digit(&mut self, digit: u8) {
        let Some(c) = char::from_digit(u32::from(digit), 10) else {
            return;
        };

        self.reset_display_if_needed();

        if self.waiting_for_new_number {
            self.current = c.to_string();
            self.waiting_for_new_number = false;
        } else if self.current == "0" {
            self.current = c.to_string();
        } else {
            self.current.push(c);
        }
    }

    pub fn input_decimal(&mut self) {
        self.reset_display_if_needed();

        if self.waiting_for_new_number {
            self.current = "0.".to_string();
            self.waiting_for_new_number = false;
            return;
        }

        if !self.current.contains('.') {
            self.current.push('.');
        }
    }

    pub fn input_operator(&mut self, op: Operator) {
        let input_value = parse_operand(&self.current).unwrap_or(f64::NAN);

        if self.previous.is_none() {
            self.previous = Some(input_value);
        } else if self.operator.is_some() && !self.waiting_for_new_number {
            let result = self.perform_calculation();
            debug!(result, "chained keypad operation");
            self.current = to_stored(result);
            self.previous = Some(result);
        } else {
            self.previous = Some(input_value);
        }

        self.waiting_for_new_number = true;
        self.operator = Some(op);
    }

    /// Resolve the pending operation. No-op unless an operator is pending and
    /// a right operand has been entered.
    pub fn equals(&mut self) {
        if self.operator.is_none() || self.previous.is_none() || self.waiting_for_new_number {
            return;
        }

        let result = self.perform_calculation();
        debug!(result, "keypad equals");
        self.current = to_stored(result);
        self.previous = None;
        self.operator = None;
        self.should_reset_display = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Remove the last typed character. Clears everything while a result is
    /// shown.
    pub fn delete_last(&mut self) {
        if self.should_reset_display {
            self.clear();
            return;
        }

        self.current.pop();
        if self.current.is_empty() || self.current == "-" {
            self.current = "0".to_string();
        }
    }

    /// Show a value computed elsewhere (voice or text input) as a result.
    pub fn apply_external_result(&mut self, value: f64) {
        self.current = to_stored(value);
        self.previous = None;
        self.operator = None;
        self.waiting_for_new_number = false;
        self.should_reset_display = true;
    }

    fn reset_display_if_needed(&mut self) {
        if self.should_reset_display {
            self.current = "0".to_string();
            self.should_reset_display = false;
        }
    }

    fn perform_calculation(&self) -> f64 {
        let lhs = self.previous.unwrap_or(f64::NAN);
        let rhs = parse_operand(&self.current).unwrap_or(f64::NAN);

        if lhs.is_nan() || rhs.is_nan() {
            return 0.0;
        }

        match self.operator {
            Some(op) => op.apply(lhs, rhs),
            None => rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(keypad: &mut Keypad, keys: &str) {
        for c in keys.chars() {
            let event = match c {
                '0'..='9' => KeypadEvent::Digit(c as u8 - b'0'),
                '.' => KeypadEvent::Decimal,
                '=' => KeypadEvent::Equals,
                'C' => KeypadEvent::Clear,
                '<' => KeypadEvent::Delete,
                other => KeypadEvent::Operator(Operator::from_char(other).unwrap()),
            };
            keypad.handle(event);
        }
    }

    fn run(keys: &str) -> Keypad {
        let mut keypad = Keypad::new();
        press(&mut keypad, keys);
        keypad
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut keypad = run("12+3");
        keypad.clear();
        assert_eq!(keypad.current(), "0");
        assert_eq!(keypad.previous(), None);
        assert_eq!(keypad.operator(), None);
        assert_eq!(keypad.phase(), Phase::Idle);
        assert_eq!(keypad, Keypad::default());
    }

    #[test]
    fn test_digits_concatenate_with_leading_zero_collapsed() {
        assert_eq!(run("0").current(), "0");
        assert_eq!(run("007").current(), "7");
        assert_eq!(run("1203").current(), "1203");
        assert_eq!(run("000").current(), "0");
    }

    #[test]
    fn test_decimal_point() {
        assert_eq!(run(".").current(), "0.");
        assert_eq!(run("1.5.2").current(), "1.52");
        assert_eq!(run("3+.").current(), "0.");
        assert_eq!(run("1.5+.2").current(), "0.2");
    }

    #[test]
    fn test_operator_then_equals_is_noop() {
        let mut keypad = run("7+");
        let before = keypad.clone();
        keypad.equals();
        assert_eq!(keypad, before);
        assert_eq!(keypad.phase(), Phase::AwaitingOperand);
    }

    #[test]
    fn test_equals_without_operator_is_noop() {
        let mut keypad = run("42");
        let before = keypad.clone();
        keypad.equals();
        assert_eq!(keypad, before);
    }

    #[test]
    fn test_chained_operations_left_to_right() {
        let keypad = run("2+3+4=");
        assert_eq!(keypad.current(), "9");
        assert_eq!(keypad.phase(), Phase::ResultShown);

        // no precedence: (2 + 3) * 4
        assert_eq!(run("2+3*4=").current(), "20");
    }

    #[test]
    fn test_chained_operator_shows_intermediate_result() {
        let keypad = run("6*7-");
        assert_eq!(keypad.current(), "42");
        assert_eq!(keypad.previous(), Some(42.0));
        assert_eq!(keypad.operator(), Some(Operator::Subtract));
    }

    #[test]
    fn test_operator_overwrite_keeps_operand() {
        let keypad = run("5+-");
        assert_eq!(keypad.previous(), Some(5.0));
        assert_eq!(keypad.operator(), Some(Operator::Subtract));
        assert_eq!(run("5+-2=").current(), "3");
    }

    #[test]
    fn test_division_by_zero_yields_zero() {
        assert_eq!(run("8/0=").current(), "0");
        assert_eq!(run("9/3=").current(), "3");
    }

    #[test]
    fn test_remainder_follows_dividend() {
        assert_eq!(run("7%3=").current(), "1");
        assert_eq!(run("2-9=%4=").current(), "-3");
    }

    #[test]
    fn test_remainder_by_zero_is_not_a_number() {
        let keypad = run("5%0=");
        assert_eq!(keypad.current(), "NaN");

        // a non-numeric operand resolves to 0
        assert_eq!(run("5%0=+1=").current(), "0");
    }

    #[test]
    fn test_result_shown_starts_fresh_number() {
        let mut keypad = run("1+1=");
        assert_eq!(keypad.current(), "2");
        press(&mut keypad, "5");
        assert_eq!(keypad.current(), "5");
        assert_eq!(keypad.phase(), Phase::Idle);
    }

    #[test]
    fn test_result_can_be_used_as_left_operand() {
        assert_eq!(run("1+1=*10=").current(), "20");
    }

    #[test]
    fn test_delete_last() {
        assert_eq!(run("123<").current(), "12");
        assert_eq!(run("1<").current(), "0");
        assert_eq!(run("<<").current(), "0");
    }

    #[test]
    fn test_delete_after_result_clears() {
        let mut keypad = run("4+4=");
        keypad.delete_last();
        assert_eq!(keypad, Keypad::default());
    }

    #[test]
    fn test_delete_floors_dangling_sign() {
        let mut keypad = run("2-9-");
        assert_eq!(keypad.current(), "-7");
        keypad.delete_last();
        keypad.delete_last();
        assert_eq!(keypad.current(), "0");
    }

    #[test]
    fn test_apply_external_result() {
        let mut keypad = run("3*");
        keypad.apply_external_result(20.0);
        assert_eq!(keypad.current(), "20");
        assert_eq!(keypad.operator(), None);
        assert_eq!(keypad.previous(), None);
        assert_eq!(keypad.phase(), Phase::ResultShown);

        press(&mut keypad, "+1=");
        assert_eq!(keypad.current(), "21");
    }

    #[test]
    fn test_floating_point_results_are_stored_exactly() {
        assert_eq!(run(".1+.2=").current(), "0.30000000000000004");
    }
}
