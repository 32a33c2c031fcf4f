//! Restricted expression evaluator behind the `eval` command.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := eq ( "&&" eq )*
//! eq      := cmp ( ("==" | "!=") cmp )*
//! cmp     := add ( ("<" | "<=" | ">" | ">=") add )*
//! add     := mul ( ("+" | "-") mul )*
//! mul     := unary ( ("*" | "/" | "%") unary )*
//! unary   := ("!" | "-") unary | primary
//! primary := number | string | "true" | "false" | "(" or ")"
//! ```
//!
//! Nothing outside this grammar is reachable; there are no identifiers,
//! calls or assignments.

use std::fmt;

use blockterm_types::error::Result;

use crate::interpreter::{ArgSpec, Command, CommandResult, Environment};

/// Maximum nesting depth for parentheses and unary operators.
const EVAL_MAX_DEPTH: usize = 64;

/// A value produced by evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.is_finite() && *n == n.floor() && n.abs() < i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            },
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character: {0}")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("missing closing parenthesis")]
    MissingParen,

    #[error("expression too deeply nested")]
    TooDeep,

    #[error("division by zero")]
    DivisionByZero,

    #[error("number out of range")]
    Overflow,

    #[error("cannot apply {op} to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot apply {op} to {operand}")]
    BadOperand {
        op: &'static str,
        operand: &'static str,
    },
}

type EvalResult<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Bool(bool),
    Op(&'static str),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Op(op) => f.write_str(op),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

/// Evaluate `input` against the restricted grammar.
pub fn evaluate(input: &str) -> EvalResult<Value> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.or(0)?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(EvalError::UnexpectedToken(tok.to_string())),
    }
}

const TWO_CHAR_OPS: [&str; 6] = ["==", "!=", "<=", ">=", "&&", "||"];
const ONE_CHAR_OPS: [&str; 8] = ["+", "-", "*", "/", "%", "<", ">", "!"];

fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch.is_ascii_digit() || ch == '.' {
            let mut num = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    num.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let n: f64 = num.parse().map_err(|_| EvalError::InvalidNumber(num))?;
            if !n.is_finite() {
                return Err(EvalError::Overflow);
            }
            tokens.push(Token::Num(n));
        } else if ch == '"' || ch == '\'' {
            chars.next();
            tokens.push(Token::Str(read_string(&mut chars, ch)?));
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            match word.as_str() {
                "true" => tokens.push(Token::Bool(true)),
                "false" => tokens.push(Token::Bool(false)),
                _ => return Err(EvalError::UnknownIdentifier(word)),
            }
        } else if ch == '(' {
            chars.next();
            tokens.push(Token::LParen);
        } else if ch == ')' {
            chars.next();
            tokens.push(Token::RParen);
        } else {
            chars.next();
            let pair: Option<String> = chars.peek().map(|&next| [ch, next].iter().collect());
            if let Some(op) = pair
                .as_deref()
                .and_then(|p| TWO_CHAR_OPS.iter().copied().find(|op| *op == p))
            {
                chars.next();
                tokens.push(Token::Op(op));
            } else if let Some(op) = ONE_CHAR_OPS
                .iter()
                .copied()
                .find(|op| op.starts_with(ch) && op.len() == ch.len_utf8())
            {
                tokens.push(Token::Op(op));
            } else {
                return Err(EvalError::UnexpectedChar(ch));
            }
        }
    }
    Ok(tokens)
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> EvalResult<String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err(EvalError::UnterminatedString),
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                None => return Err(EvalError::UnterminatedString),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
            },
            Some(c) => out.push(c),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume the next token if it is one of `ops`.
    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            },
            _ => None,
        }
    }

    fn or(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.and(depth)?;
        while let Some(op) = self.eat_op(&["||"]) {
            let right = self.and(depth)?;
            let (l, r) = as_bool(op, &left, &right)?;
            left = Value::Bool(l || r);
        }
        Ok(left)
    }

    fn and(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.equality(depth)?;
        while let Some(op) = self.eat_op(&["&&"]) {
            let right = self.equality(depth)?;
            let (l, r) = as_bool(op, &left, &right)?;
            left = Value::Bool(l && r);
        }
        Ok(left)
    }

    fn equality(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.comparison(depth)?;
        while let Some(op) = self.eat_op(&["==", "!="]) {
            let right = self.comparison(depth)?;
            let eq = left == right;
            left = Value::Bool(if op == "==" { eq } else { !eq });
        }
        Ok(left)
    }

    fn comparison(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.additive(depth)?;
        while let Some(op) = self.eat_op(&["<", "<=", ">", ">="]) {
            let right = self.additive(depth)?;
            let ord = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, &left, &right)),
            };
            let result = match (op, ord) {
                (_, None) => false,
                ("<", Some(o)) => o.is_lt(),
                ("<=", Some(o)) => o.is_le(),
                (">", Some(o)) => o.is_gt(),
                (_, Some(o)) => o.is_ge(),
            };
            left = Value::Bool(result);
        }
        Ok(left)
    }

    fn additive(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.multiplicative(depth)?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            let right = self.multiplicative(depth)?;
            left = match (op, &left, &right) {
                ("+", Value::Number(a), Value::Number(b)) => finite(a + b)?,
                ("+", Value::Str(_), _) | ("+", _, Value::Str(_)) => {
                    Value::Str(format!("{left}{right}"))
                },
                ("-", Value::Number(a), Value::Number(b)) => finite(a - b)?,
                _ => return Err(mismatch(op, &left, &right)),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self, depth: usize) -> EvalResult<Value> {
        let mut left = self.unary(depth)?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let right = self.unary(depth)?;
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(mismatch(op, &left, &right));
            };
            let (a, b) = (*a, *b);
            left = match op {
                "*" => finite(a * b)?,
                _ if b == 0.0 => return Err(EvalError::DivisionByZero),
                "/" => finite(a / b)?,
                _ => finite(a % b)?,
            };
        }
        Ok(left)
    }

    fn unary(&mut self, depth: usize) -> EvalResult<Value> {
        let Some(op) = self.eat_op(&["!", "-"]) else {
            return self.primary(depth);
        };
        if depth >= EVAL_MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        let operand = self.unary(depth + 1)?;
        match (op, operand) {
            ("!", Value::Bool(b)) => Ok(Value::Bool(!b)),
            ("-", Value::Number(n)) => Ok(Value::Number(-n)),
            (op, other) => Err(EvalError::BadOperand {
                op,
                operand: other.type_name(),
            }),
        }
    }

    fn primary(&mut self, depth: usize) -> EvalResult<Value> {
        let Some(tok) = self.tokens.get(self.pos).cloned() else {
            return Err(EvalError::UnexpectedEnd);
        };
        self.pos += 1;
        match tok {
            Token::Num(n) => Ok(Value::Number(n)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::LParen => {
                if depth >= EVAL_MAX_DEPTH {
                    return Err(EvalError::TooDeep);
                }
                let val = self.or(depth + 1)?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(EvalError::MissingParen);
                }
                self.pos += 1;
                Ok(val)
            },
            other => Err(EvalError::UnexpectedToken(other.to_string())),
        }
    }
}

/// Arithmetic results must stay finite.
fn finite(n: f64) -> EvalResult<Value> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EvalError::Overflow)
    }
}

fn as_bool(op: &'static str, left: &Value, right: &Value) -> EvalResult<(bool, bool)> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok((*a, *b)),
        _ => Err(mismatch(op, left, right)),
    }
}

fn mismatch(op: &'static str, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}

// ---------------------------------------------------------------------------
// eval
// ---------------------------------------------------------------------------

pub(crate) struct EvalCmd;
impl Command for EvalCmd {
    fn name(&self) -> &str {
        "eval"
    }
    fn description(&self) -> &str {
        "Evaluates specified expression"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("code", "expression code")];
        ARGS
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        match evaluate(&args.join(" ")) {
            Ok(value) => Ok(CommandResult::Text(value.to_string())),
            Err(e) => Ok(CommandResult::Error(format!("eval: {e}"))),
        }
    }
}
