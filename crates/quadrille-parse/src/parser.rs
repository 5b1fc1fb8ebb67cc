//! Converts the token stream into an expression tree.

use crate::tokenizer::{Associativity, Token, TokenSubType, TokenType, Tokenizer, TokenizerError};
use quadrille_common::{letters_to_column, Position, MAX_COLS, MAX_ROWS};

use std::error::Error;
use std::fmt::{self, Display};

/// A custom error type for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub message: String,
    pub position: Option<usize>,
}

impl Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(f, "ParserError at position {}: {}", pos, self.message)
        } else {
            write!(f, "ParserError: {}", self.message)
        }
    }
}

impl Error for ParserError {}

impl From<TokenizerError> for ParserError {
    fn from(err: TokenizerError) -> Self {
        ParserError {
            message: err.message,
            position: Some(err.pos),
        }
    }
}

/// The different types of AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTNodeType {
    Literal(f64),
    Reference {
        /// Original reference text, preserved so out-of-grid references can
        /// still be printed back verbatim.
        original: String,
        /// Parsed position; [`Position::INVALID`] when the reference names a
        /// cell outside the grid. Such references evaluate to `#REF!`.
        position: Position,
    },
    UnaryOp {
        op: String,
        expr: Box<ASTNode>,
    },
    BinaryOp {
        op: String,
        left: Box<ASTNode>,
        right: Box<ASTNode>,
    },
}

/// An AST node represents a parsed formula element.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTNode {
    pub node_type: ASTNodeType,
    pub source_token: Option<Token>,
}

impl ASTNode {
    pub fn new(node_type: ASTNodeType, source_token: Option<Token>) -> Self {
        ASTNode {
            node_type,
            source_token,
        }
    }

    /// All valid positions referenced by this expression, sorted and
    /// deduplicated. Out-of-grid references are excluded; they cannot name a
    /// cell and surface as `#REF!` when evaluated.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        self.collect_references(&mut cells);
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    fn collect_references(&self, cells: &mut Vec<Position>) {
        match &self.node_type {
            ASTNodeType::Reference { position, .. } => {
                if position.is_valid() {
                    cells.push(*position);
                }
            }
            ASTNodeType::UnaryOp { expr, .. } => expr.collect_references(cells),
            ASTNodeType::BinaryOp { left, right, .. } => {
                left.collect_references(cells);
                right.collect_references(cells);
            }
            ASTNodeType::Literal(_) => {}
        }
    }
}

impl Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_type {
            ASTNodeType::Literal(value) => write!(f, "Literal({value})"),
            ASTNodeType::Reference { original, .. } => write!(f, "Reference({original})"),
            ASTNodeType::UnaryOp { op, expr } => write!(f, "UnaryOp({op}, {expr})"),
            ASTNodeType::BinaryOp { op, left, right } => {
                write!(f, "BinaryOp({op}, {left}, {right})")
            }
        }
    }
}

/// A parser for converting tokens into an AST.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    /// Parse the tokens into an AST.
    pub fn parse(&mut self) -> Result<ASTNode, ParserError> {
        if self.tokens.is_empty() {
            return Err(ParserError {
                message: "no tokens to parse".to_string(),
                position: None,
            });
        }

        let ast = self.parse_expression()?;
        if self.position < self.tokens.len() {
            return Err(ParserError {
                message: format!(
                    "unexpected token {}",
                    self.tokens[self.position]
                ),
                position: Some(self.tokens[self.position].start),
            });
        }
        Ok(ast)
    }

    fn parse_expression(&mut self) -> Result<ASTNode, ParserError> {
        self.parse_binary_op(0)
    }

    fn parse_binary_op(&mut self, min_precedence: u8) -> Result<ASTNode, ParserError> {
        let mut left = self.parse_unary_op()?;

        while self.position < self.tokens.len() {
            let token = &self.tokens[self.position];
            if token.token_type != TokenType::OpInfix {
                break;
            }

            let (precedence, associativity) =
                token.get_precedence().unwrap_or((0, Associativity::Left));
            if precedence < min_precedence {
                break;
            }

            let op_token = self.tokens[self.position].clone();
            self.position += 1;

            let next_min_precedence = if associativity == Associativity::Left {
                precedence + 1
            } else {
                precedence
            };

            let right = self.parse_binary_op(next_min_precedence)?;
            left = ASTNode::new(
                ASTNodeType::BinaryOp {
                    op: op_token.value.clone(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Some(op_token),
            );
        }

        Ok(left)
    }

    fn parse_unary_op(&mut self) -> Result<ASTNode, ParserError> {
        if self.position < self.tokens.len()
            && self.tokens[self.position].token_type == TokenType::OpPrefix
        {
            let op_token = self.tokens[self.position].clone();
            self.position += 1;
            let expr = self.parse_unary_op()?;
            return Ok(ASTNode::new(
                ASTNodeType::UnaryOp {
                    op: op_token.value.clone(),
                    expr: Box::new(expr),
                },
                Some(op_token),
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ASTNode, ParserError> {
        if self.position >= self.tokens.len() {
            return Err(ParserError {
                message: "unexpected end of expression".to_string(),
                position: self.tokens.last().map(|t| t.end),
            });
        }

        let token = &self.tokens[self.position];
        match token.token_type {
            TokenType::Operand => {
                let operand_token = self.tokens[self.position].clone();
                self.position += 1;
                self.parse_operand(operand_token)
            }
            TokenType::Paren if token.subtype == TokenSubType::Open => {
                self.position += 1;
                let expr = self.parse_expression()?;
                if self.position >= self.tokens.len()
                    || self.tokens[self.position].token_type != TokenType::Paren
                    || self.tokens[self.position].subtype != TokenSubType::Close
                {
                    return Err(ParserError {
                        message: "expected closing parenthesis".to_string(),
                        position: self.tokens.get(self.position).map(|t| t.start),
                    });
                }
                self.position += 1;
                Ok(expr)
            }
            _ => Err(ParserError {
                message: format!("unexpected token {token}"),
                position: Some(token.start),
            }),
        }
    }

    fn parse_operand(&mut self, token: Token) -> Result<ASTNode, ParserError> {
        match token.subtype {
            TokenSubType::Number => {
                let value = token.value.parse::<f64>().map_err(|_| ParserError {
                    message: format!("invalid number '{}'", token.value),
                    position: Some(token.start),
                })?;
                Ok(ASTNode::new(ASTNodeType::Literal(value), Some(token)))
            }
            TokenSubType::Reference => {
                let position = parse_reference(&token.value);
                Ok(ASTNode::new(
                    ASTNodeType::Reference {
                        original: token.value.clone(),
                        position,
                    },
                    Some(token),
                ))
            }
            _ => Err(ParserError {
                message: format!("unexpected operand subtype {:?}", token.subtype),
                position: Some(token.start),
            }),
        }
    }
}

/// Resolve a `LETTERS DIGITS` reference token into a position.
///
/// The tokenizer guarantees the shape; coordinates that overflow the grid
/// collapse to [`Position::INVALID`] rather than failing the parse, so the
/// error surfaces at evaluation time as `#REF!`.
fn parse_reference(reference: &str) -> Position {
    let digits_at = reference
        .bytes()
        .position(|b| b.is_ascii_digit())
        .expect("tokenizer emits letters followed by digits");
    let (letters, digits) = reference.split_at(digits_at);

    let col = match letters_to_column(letters) {
        Some(col) if col < MAX_COLS => col,
        _ => return Position::INVALID,
    };
    let row = match digits.parse::<u32>() {
        Ok(row) if row >= 1 && row <= MAX_ROWS => row - 1,
        _ => return Position::INVALID,
    };
    Position::new(row, col)
}

/// Parse a formula expression (without the leading `=`).
pub fn parse<T: AsRef<str>>(expression: T) -> Result<ASTNode, ParserError> {
    let tokens = Tokenizer::new(expression.as_ref())?.items;
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(a1: &str) -> Position {
        Position::from_a1(a1).unwrap()
    }

    #[test]
    fn parses_precedence() {
        let ast = parse("1+2*3").unwrap();
        match ast.node_type {
            ASTNodeType::BinaryOp { op, right, .. } => {
                assert_eq!(op, "+");
                assert!(matches!(
                    right.node_type,
                    ASTNodeType::BinaryOp { ref op, .. } if op == "*"
                ));
            }
            other => panic!("expected '+' at root, got {other:?}"),
        }
    }

    #[test]
    fn parses_parenthesized_group() {
        let ast = parse("(1+2)*3").unwrap();
        match ast.node_type {
            ASTNodeType::BinaryOp { op, left, .. } => {
                assert_eq!(op, "*");
                assert!(matches!(
                    left.node_type,
                    ASTNodeType::BinaryOp { ref op, .. } if op == "+"
                ));
            }
            other => panic!("expected '*' at root, got {other:?}"),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        // 8-3-2 must parse as (8-3)-2.
        let ast = parse("8-3-2").unwrap();
        match ast.node_type {
            ASTNodeType::BinaryOp { op, left, right } => {
                assert_eq!(op, "-");
                assert!(matches!(left.node_type, ASTNodeType::BinaryOp { .. }));
                assert!(matches!(right.node_type, ASTNodeType::Literal(v) if v == 2.0));
            }
            other => panic!("expected '-' at root, got {other:?}"),
        }
    }

    #[test]
    fn parses_unary_chain() {
        let ast = parse("--1").unwrap();
        match ast.node_type {
            ASTNodeType::UnaryOp { op, expr } => {
                assert_eq!(op, "-");
                assert!(matches!(expr.node_type, ASTNodeType::UnaryOp { .. }));
            }
            other => panic!("expected unary at root, got {other:?}"),
        }
    }

    #[test]
    fn collects_sorted_deduplicated_references() {
        let ast = parse("B2+A1*B2+C3").unwrap();
        assert_eq!(ast.referenced_cells(), vec![pos("A1"), pos("B2"), pos("C3")]);
    }

    #[test]
    fn out_of_grid_reference_parses_to_invalid() {
        let ast = parse("A1+ZZZZ999").unwrap();
        // Only the valid reference is reported.
        assert_eq!(ast.referenced_cells(), vec![pos("A1")]);

        let ast = parse("A99999").unwrap();
        assert!(matches!(
            ast.node_type,
            ASTNodeType::Reference { position, .. } if !position.is_valid()
        ));
    }

    #[test]
    fn rejects_trailing_tokens() {
        for expr in ["1 2", "A1 B1", "1+2)", "(1+2"] {
            assert!(parse(expr).is_err(), "{expr}");
        }
    }

    #[test]
    fn rejects_dangling_operators() {
        for expr in ["1+", "*2", "1*/2", "()", ""] {
            assert!(parse(expr).is_err(), "{expr}");
        }
    }
}
