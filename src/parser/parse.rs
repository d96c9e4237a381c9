//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent parser with one token of lookahead:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: declarations, control flow and host calls
//! - `expressions`: arithmetic expressions, literals and calls
//! - `gui`: the GUI-element sublanguage (`window`, `button`, ...)
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The parser pulls tokens from the [`Lexer`] as it goes. It only ever holds
//! the current token; the `def` rule additionally peeks one token ahead.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind, TokenValue};
use thiserror::Error;

/// Deepest allowed nesting of expressions and blocks combined
pub const MAX_NESTING_DEPTH: usize = 128;

/// Which stage rejected the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The lexer could not produce the next token.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required but something else was found.
    #[error("Parse error at {location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: expected expression, found {found}")]
    ExpectedExpression {
        found: String,
        location: SourceLocation,
    },

    /// Something other than a GUI element inside `window` or `container`.
    #[error("Parse error at {location}: expected GUI element, found {found}")]
    ExpectedElement {
        found: String,
        location: SourceLocation,
    },

    /// End of input reached before the `end` of an open block.
    #[error(
        "Parse error at {location}: '{construct}' block opened at {opened_at} is missing its 'end'"
    )]
    UnclosedBlock {
        construct: &'static str,
        opened_at: SourceLocation,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: nesting exceeds {} levels", MAX_NESTING_DEPTH)]
    NestingTooDeep { location: SourceLocation },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex(_) => ErrorKind::Lex,
            _ => ErrorKind::Parse,
        }
    }

    /// Position of the offending token (or character, for lex errors)
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lex(err) => err.location,
            ParseError::UnexpectedToken { location, .. }
            | ParseError::ExpectedExpression { location, .. }
            | ParseError::ExpectedElement { location, .. }
            | ParseError::UnclosedBlock { location, .. }
            | ParseError::NestingTooDeep { location } => *location,
        }
    }

    /// The message without the "error at line, column" prefix.
    pub fn message(&self) -> String {
        match self {
            ParseError::Lex(err) => err.kind.to_string(),
            ParseError::UnexpectedToken {
                expected, found, ..
            } => format!("expected {}, found {}", expected, found),
            ParseError::ExpectedExpression { found, .. } => {
                format!("expected expression, found {}", found)
            }
            ParseError::ExpectedElement { found, .. } => {
                format!("expected GUI element, found {}", found)
            }
            ParseError::UnclosedBlock {
                construct,
                opened_at,
                ..
            } => format!(
                "'{}' block opened at {} is missing its 'end'",
                construct, opened_at
            ),
            ParseError::NestingTooDeep { .. } => {
                format!("nesting exceeds {} levels", MAX_NESTING_DEPTH)
            }
        }
    }
}

/// Recursive descent parser for GB source code
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) current: Token,
    depth: usize,
}

impl Parser {
    /// Create a parser and read the first token.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Parse the entire program (top-level statements and GUI elements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let node = self.parse_statement()?;
            program.nodes.push(node);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consume a token of `kind` or fail naming the expected kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect_token(kind, &kind.to_string())
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        let token = self.expect_token(TokenKind::Identifier, expected)?;
        Ok(into_text(token))
    }

    /// Consume a `"..."` string token and return its unescaped value.
    pub(crate) fn expect_string(&mut self, expected: &str) -> Result<String, ParseError> {
        let token = self.expect_token(TokenKind::String, expected)?;
        Ok(into_text(token))
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current.to_string(),
            location: self.current_location(),
        }
    }

    /// True when the next token is `kind` and starts right where the
    /// current token ends, with nothing in between.
    pub(crate) fn next_is_adjacent(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        let end = self.current.end();
        let next = self.lexer.peek_token()?;
        Ok(next.kind == kind && next.offset == end)
    }

    /// Run `parse` one nesting level deeper. Fails instead of recursing
    /// past [`MAX_NESTING_DEPTH`].
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                location: self.current_location(),
            });
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse statements until one of `terminators` is current. The
    /// terminator itself is left for the caller.
    pub(crate) fn parse_block(
        &mut self,
        construct: &'static str,
        opened_at: SourceLocation,
        terminators: &[TokenKind],
    ) -> Result<Vec<AstNode>, ParseError> {
        self.nested(|parser| {
            let mut statements = Vec::new();

            while !terminators.contains(&parser.current.kind) {
                if parser.is_at_end() {
                    return Err(ParseError::UnclosedBlock {
                        construct,
                        opened_at,
                        location: parser.current_location(),
                    });
                }
                statements.push(parser.parse_statement()?);
            }

            Ok(statements)
        })
    }
}

/// Identifier, string and quoted-literal tokens always carry text.
pub(crate) fn into_text(token: Token) -> String {
    match token.value {
        TokenValue::Str(s) => s,
        _ => String::new(),
    }
}
