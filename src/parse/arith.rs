//! Arithmetic sub-language used by backtick parameters and the `expr` command.
//!
//! Supports `+ - * / % ^`, `**`, parentheses and unary minus. A `(` glued to
//! an operand, or a `)` glued to the next operand, implies multiplication:
//! `2(3)` is `2*(3)` and `(1)(2)` is `(1)*(2)`.

use std::fmt;

use thiserror::Error;

/// Failure evaluating an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Meaning of the `^` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Caret {
    /// `2^6 = 64`
    #[default]
    Power,
    /// `2^6 = 4`, integer-only, binds looser than `+`/`-`.
    Xor,
}

/// Integer or float result. Integer arithmetic stays integral until it
/// overflows or meets `/`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map_or(Number::Float(a as f64 + b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map_or(Number::Float(a as f64 - b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map_or(Number::Float(a as f64 * b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    fn div(self, rhs: Number) -> Result<Number, ExprError> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        Ok(Number::Float(self.as_f64() / divisor))
    }

    /// Floored modulo: the result takes the sign of the divisor.
    fn rem(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (_, Number::Int(0)) => Err(ExprError::DivisionByZero),
            (Number::Int(a), Number::Int(b)) => {
                let mut r = a.checked_rem(b).unwrap_or(0);
                if r != 0 && (r < 0) != (b < 0) {
                    r += b;
                }
                Ok(Number::Int(r))
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if b == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                let mut r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r += b;
                }
                Ok(Number::Float(r))
            }
        }
    }

    fn pow(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) if b >= 0 => Ok(u32::try_from(b)
                .ok()
                .and_then(|e| a.checked_pow(e))
                .map_or(Number::Float((a as f64).powf(b as f64)), Number::Int)),
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if a == 0.0 && b < 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                let r = a.powf(b);
                if r.is_nan() {
                    return Err(ExprError::Unsupported(format!(
                        "{a} raised to a fractional power"
                    )));
                }
                Ok(Number::Float(r))
            }
        }
    }

    fn xor(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a ^ b)),
            _ => Err(ExprError::Unsupported("^ on non-integer operands".into())),
        }
    }

    fn neg(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map_or(Number::Float(-(i as f64)), Number::Int),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part: 2.0, not 2
            Number::Float(x) if x.is_finite() => write!(f, "{x:?}"),
            Number::Float(x) if x.is_nan() => f.write_str("nan"),
            Number::Float(x) if *x > 0.0 => f.write_str("inf"),
            Number::Float(_) => f.write_str("-inf"),
        }
    }
}

/// Evaluates arithmetic expressions with a fixed `^` meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    caret: Caret,
}

impl Evaluator {
    pub fn new(caret: Caret) -> Self {
        Self { caret }
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn evaluate(&self, expression: &str) -> Result<Number, ExprError> {
        if expression.trim().is_empty() {
            return Err(ExprError::Empty);
        }
        let prepared = insert_implicit_multiplication(expression);
        let tokens = lex(&prepared)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            caret: self.caret,
            depth: 0,
        };
        let value = parser.expression()?;
        match parser.peek() {
            None => Ok(value),
            Some(t) => Err(ExprError::Syntax {
                position: t.offset,
                message: format!("unexpected {}", t.kind),
            }),
        }
    }
}

/// Evaluate with the default (`^` = power) semantics.
pub fn evaluate(expression: &str) -> Result<Number, ExprError> {
    Evaluator::default().evaluate(expression)
}

const OPERATORS: [char; 7] = [' ', '+', '-', '/', '*', '^', '%'];

/// Wrap in parentheses, then insert `*` before a `(` that follows an operand
/// and after a `)` that precedes one.
fn insert_implicit_multiplication(expression: &str) -> String {
    let wrapped: Vec<char> = format!("({expression})").chars().collect();
    let mut out = String::with_capacity(wrapped.len() + 4);
    for (i, &c) in wrapped.iter().enumerate() {
        if c == '('
            && let Some(prev) = out.chars().next_back()
            && prev != '('
            && !OPERATORS.contains(&prev)
        {
            out.push('*');
        }
        out.push(c);
        if c == ')'
            && let Some(&next) = wrapped.get(i + 1)
            && next != ')'
            && !OPERATORS.contains(&next)
        {
            out.push('*');
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Pow,
    LParen,
    RParen,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Num(n) => return write!(f, "number {n}"),
            Kind::Plus => "'+'",
            Kind::Minus => "'-'",
            Kind::Star => "'*'",
            Kind::Slash => "'/'",
            Kind::Percent => "'%'",
            Kind::Caret => "'^'",
            Kind::Pow => "'**'",
            Kind::LParen => "'('",
            Kind::RParen => "')'",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: Kind,
    offset: usize,
}

fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent suffix: 1e3, 2.5E-2
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: Kind::Num(parse_number(&text, start)?),
                    offset: start,
                });
                continue;
            }
            '+' => Kind::Plus,
            '-' => Kind::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Kind::Pow
            }
            '*' => Kind::Star,
            '/' => Kind::Slash,
            '%' => Kind::Percent,
            '^' => Kind::Caret,
            '(' => Kind::LParen,
            ')' => Kind::RParen,
            other => {
                return Err(ExprError::Syntax {
                    position: i,
                    message: format!("unexpected character {other:?}"),
                });
            }
        };
        tokens.push(Token { kind, offset: i });
        i += 1;
    }
    Ok(tokens)
}

fn parse_number(text: &str, offset: usize) -> Result<Number, ExprError> {
    if !text.contains(['.', 'e', 'E'])
        && let Ok(i) = text.parse::<i64>()
    {
        return Ok(Number::Int(i));
    }
    text.parse::<f64>()
        .map(Number::Float)
        .map_err(|_| ExprError::Syntax {
            position: offset,
            message: format!("invalid number {text:?}"),
        })
}

/// Precedence-climbing parser, evaluating as it goes.
///
/// ```text
/// expression := xor                       (caret = xor)
///             | additive                  (caret = power)
/// xor        := additive ('^' additive)*
/// additive   := term (('+' | '-') term)*
/// term       := unary (('*' | '/' | '%') unary)*
/// unary      := ('-' | '+') unary | power
/// power      := primary (('**' | '^') unary)?
/// primary    := number | '(' expression ')'
/// ```
///
/// Every recursive path passes through `unary`, so nesting is bounded there.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    caret: Caret,
    depth: usize,
}

/// Deepest `unary` nesting (parentheses, signs, exponents) accepted.
const MAX_DEPTH: usize = 256;

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn eat(&mut self, kind: Kind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.offset + 1)
    }

    fn expression(&mut self) -> Result<Number, ExprError> {
        match self.caret {
            Caret::Power => self.additive(),
            Caret::Xor => {
                let mut value = self.additive()?;
                while self.eat(Kind::Caret) {
                    value = value.xor(self.additive()?)?;
                }
                Ok(value)
            }
        }
    }

    fn additive(&mut self) -> Result<Number, ExprError> {
        let mut value = self.term()?;
        loop {
            if self.eat(Kind::Plus) {
                value = value.add(self.term()?);
            } else if self.eat(Kind::Minus) {
                value = value.sub(self.term()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<Number, ExprError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(Kind::Star) {
                value = value.mul(self.unary()?);
            } else if self.eat(Kind::Slash) {
                value = value.div(self.unary()?)?;
            } else if self.eat(Kind::Percent) {
                value = value.rem(self.unary()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<Number, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::Syntax {
                position: self.peek().map_or(self.end_offset(), |t| t.offset),
                message: "expression nested too deeply".into(),
            });
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<Number, ExprError> {
        if self.eat(Kind::Minus) {
            return Ok(self.unary()?.neg());
        }
        if self.eat(Kind::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Number, ExprError> {
        let base = self.primary()?;
        let is_pow = self.eat(Kind::Pow) || (self.caret == Caret::Power && self.eat(Kind::Caret));
        if is_pow {
            // right-associative, and the exponent may carry its own sign
            return base.pow(self.unary()?);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Number, ExprError> {
        match self.bump() {
            Some(Token {
                kind: Kind::Num(n), ..
            }) => Ok(n),
            Some(Token {
                kind: Kind::LParen, ..
            }) => {
                let value = self.expression()?;
                if !self.eat(Kind::RParen) {
                    let position = self.peek().map_or(self.end_offset(), |t| t.offset);
                    return Err(ExprError::Syntax {
                        position,
                        message: "expected ')'".into(),
                    });
                }
                Ok(value)
            }
            Some(t) => Err(ExprError::Syntax {
                position: t.offset,
                message: format!("unexpected {}", t.kind),
            }),
            None => Err(ExprError::Syntax {
                position: self.end_offset(),
                message: "unexpected end of expression".into(),
            }),
        }
    }
}
