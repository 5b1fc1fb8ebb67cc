//! Byte-walking tokenizer for the formula grammar.
//!
//! The grammar is small: decimal numbers, `A1`-style cell references, the
//! four arithmetic operators with unary `+`/`-`, and parentheses. The
//! expression arrives *without* its leading `=`; stripping the formula sign
//! is the engine's job.

use std::error::Error;
use std::fmt::{self, Display};

/// Represents operator associativity.
#[derive(Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// A custom error type for the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerError {
    pub message: String,
    pub pos: usize,
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenizerError at position {}: {}", self.pos, self.message)
    }
}

impl Error for TokenizerError {}

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Operand,
    OpPrefix,
    OpInfix,
    Paren,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The subtype of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSubType {
    None,
    Number,
    Reference,
    Open,
    Close,
}

impl Display for TokenSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A token in a formula expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub value: String,
    pub token_type: TokenType,
    pub subtype: TokenSubType,
    pub start: usize,
    pub end: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} subtype: {:?} value: {}>",
            self.token_type, self.subtype, self.value
        )
    }
}

impl Token {
    fn from_slice(
        source: &str,
        token_type: TokenType,
        subtype: TokenSubType,
        start: usize,
        end: usize,
    ) -> Self {
        Token {
            value: source[start..end].to_string(),
            token_type,
            subtype,
            start,
            end,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.token_type, TokenType::OpPrefix | TokenType::OpInfix)
    }

    /// Precedence table driving the parser's climbing loop.
    pub fn get_precedence(&self) -> Option<(u8, Associativity)> {
        // For a prefix operator, use the 'u' key.
        let op = if self.token_type == TokenType::OpPrefix {
            "u"
        } else {
            self.value.as_str()
        };

        match op {
            "u" => Some((3, Associativity::Right)),
            "*" | "/" => Some((2, Associativity::Left)),
            "+" | "-" => Some((1, Associativity::Left)),
            _ => None,
        }
    }
}

/// Tokenizes a formula expression into a flat token list.
#[derive(Debug)]
pub struct Tokenizer {
    pub items: Vec<Token>,
}

impl Tokenizer {
    pub fn new(expression: &str) -> Result<Self, TokenizerError> {
        let bytes = expression.as_bytes();
        let mut items: Vec<Token> = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            match b {
                b' ' | b'\t' => {
                    i += 1;
                }
                b'(' => {
                    items.push(Token::from_slice(
                        expression,
                        TokenType::Paren,
                        TokenSubType::Open,
                        i,
                        i + 1,
                    ));
                    i += 1;
                }
                b')' => {
                    items.push(Token::from_slice(
                        expression,
                        TokenType::Paren,
                        TokenSubType::Close,
                        i,
                        i + 1,
                    ));
                    i += 1;
                }
                b'+' | b'-' => {
                    let token_type = if Self::prefix_position(items.last()) {
                        TokenType::OpPrefix
                    } else {
                        TokenType::OpInfix
                    };
                    items.push(Token::from_slice(
                        expression,
                        token_type,
                        TokenSubType::None,
                        i,
                        i + 1,
                    ));
                    i += 1;
                }
                b'*' | b'/' => {
                    items.push(Token::from_slice(
                        expression,
                        TokenType::OpInfix,
                        TokenSubType::None,
                        i,
                        i + 1,
                    ));
                    i += 1;
                }
                b'0'..=b'9' | b'.' => {
                    let end = Self::scan_number(expression, i)?;
                    items.push(Token::from_slice(
                        expression,
                        TokenType::Operand,
                        TokenSubType::Number,
                        i,
                        end,
                    ));
                    i = end;
                }
                b'A'..=b'Z' => {
                    let end = Self::scan_reference(expression, i)?;
                    items.push(Token::from_slice(
                        expression,
                        TokenType::Operand,
                        TokenSubType::Reference,
                        i,
                        end,
                    ));
                    i = end;
                }
                _ => {
                    return Err(TokenizerError {
                        message: format!(
                            "unexpected character '{}'",
                            expression[i..].chars().next().unwrap_or('?')
                        ),
                        pos: i,
                    });
                }
            }
        }

        Ok(Tokenizer { items })
    }

    /// A `+`/`-` is prefix at expression start, after another operator, or
    /// after an opening parenthesis.
    fn prefix_position(prev: Option<&Token>) -> bool {
        match prev {
            None => true,
            Some(tok) => {
                tok.is_operator()
                    || (tok.token_type == TokenType::Paren && tok.subtype == TokenSubType::Open)
            }
        }
    }

    /// Scan `digits ['.' digits] [('e'|'E') ['+'|'-'] digits]`, then check
    /// the slice really parses as an `f64`.
    fn scan_number(source: &str, start: usize) -> Result<usize, TokenizerError> {
        let bytes = source.as_bytes();
        let mut i = start;

        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            let mut j = i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                i = j;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
        }

        if source[start..i].parse::<f64>().is_err() {
            return Err(TokenizerError {
                message: format!("invalid number '{}'", &source[start..i]),
                pos: start,
            });
        }
        Ok(i)
    }

    /// Scan `[A-Z]+ [0-9]+`.
    fn scan_reference(source: &str, start: usize) -> Result<usize, TokenizerError> {
        let bytes = source.as_bytes();
        let mut i = start;

        while i < bytes.len() && bytes[i].is_ascii_uppercase() {
            i += 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(TokenizerError {
                message: format!("expected cell reference, found '{}'", &source[start..i]),
                pos: start,
            });
        }
        Ok(i)
    }
}
