//! Arithmetic expression evaluation.
//!
//! A small precedence-climbing parser over numbers, `+ - * / %` and
//! parentheses. `* / %` bind tighter than `+ -`, both levels are left
//! associative and unary signs bind tightest of all. Division and remainder
//! follow IEEE semantics here, so `1 / 0` is infinite and rejected by the
//! finiteness check rather than mapped to zero like on the keypad.

use tracing::debug;

use crate::error::{EvalError, EvalResult, ParseError};

/// Deepest parenthesis nesting the parser accepts.
const MAX_DEPTH: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div | Self::Rem => 2,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Rem => lhs % rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TokenKind {
    Number(f64),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Op(BinaryOp::Add) => "+".to_string(),
            Self::Op(BinaryOp::Sub) => "-".to_string(),
            Self::Op(BinaryOp::Mul) => "*".to_string(),
            Self::Op(BinaryOp::Div) => "/".to_string(),
            Self::Op(BinaryOp::Rem) => "%".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

/// Split an expression into tokens. Whitespace separates tokens and is
/// otherwise ignored.
fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = pos;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[pos..end];
                let value = parse_literal(text).ok_or_else(|| ParseError::InvalidNumber {
                    pos,
                    text: text.to_string(),
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    pos,
                });
                continue;
            }
            '+' => TokenKind::Op(BinaryOp::Add),
            '-' => TokenKind::Op(BinaryOp::Sub),
            '*' => TokenKind::Op(BinaryOp::Mul),
            '/' => TokenKind::Op(BinaryOp::Div),
            '%' => TokenKind::Op(BinaryOp::Rem),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            found => return Err(ParseError::UnexpectedChar { pos, found }),
        };
        chars.next();
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

/// Parse a numeric literal: digits with at most one decimal point and at least
/// one digit (`5`, `5.`, `.5`).
fn parse_literal(text: &str) -> Option<f64> {
    if text.matches('.').count() > 1 || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse a complete expression and require that all tokens are consumed.
    fn parse(mut self) -> Result<f64, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let value = self.parse_binary(1)?;

        match self.peek() {
            None => Ok(value),
            Some(token) => Err(ParseError::UnexpectedToken {
                pos: token.pos,
                found: token.kind.describe(),
            }),
        }
    }

    /// Precedence climbing: fold binary operators with at least `min_prec`.
    fn parse_binary(&mut self, min_prec: u8) -> Result<f64, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some(Token {
            kind: TokenKind::Op(op),
            ..
        }) = self.peek()
        {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            let rhs = self.parse_binary(prec + 1)?;
            lhs = op.apply(lhs, rhs);
        }

        Ok(lhs)
    }

    /// Fold any run of leading signs into a single negation.
    fn parse_unary(&mut self) -> Result<f64, ParseError> {
        let mut negate = false;
        while let Some(Token {
            kind: TokenKind::Op(op @ (BinaryOp::Add | BinaryOp::Sub)),
            ..
        }) = self.peek()
        {
            if op == BinaryOp::Sub {
                negate = !negate;
            }
            self.advance();
        }

        let value = self.parse_primary()?;
        Ok(if negate { -value } else { value })
    }

    fn parse_primary(&mut self) -> Result<f64, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEnd)?;

        match token.kind {
            TokenKind::Number(value) => Ok(value),
            TokenKind::LParen => {
                if self.depth >= MAX_DEPTH {
                    return Err(ParseError::TooDeep { pos: token.pos });
                }
                self.depth += 1;
                let value = self.parse_binary(1)?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(value),
                    Some(other) => Err(ParseError::UnexpectedToken {
                        pos: other.pos,
                        found: other.kind.describe(),
                    }),
                    None => Err(ParseError::UnclosedParen { open: token.pos }),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                pos: token.pos,
                found: other.describe(),
            }),
        }
    }
}

/// Evaluate an arithmetic expression.
///
/// Returns an error if the expression is empty, malformed, or its value is
/// not finite.
pub fn evaluate_expression(input: &str) -> EvalResult<f64> {
    let tokens = tokenize(input)?;
    let value = Parser::new(tokens).parse()?;

    if !value.is_finite() {
        debug!(expression = input, value, "expression is not finite");
        return Err(EvalError::NonFinite(value));
    }

    Ok(value)
}
