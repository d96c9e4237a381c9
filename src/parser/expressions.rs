//! Expression parsing implementation
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true`/`false`
//! - Identifiers and function calls: `name`, `name(a, b)`
//! - Binary operators: `+ - * /`, left-associative
//! - Unary `+` and `-`
//! - Parenthesized sub-expressions
//!
//! There are no comparison or boolean operators, so `if` and `loop`
//! conditions use this same grammar.
//!
//! # Grammar
//!
//! ```text
//! expr   ::= term (("+" | "-") term)*
//! term   ::= factor (("*" | "/") factor)*
//! factor ::= NUMBER | STRING | BOOLEAN
//!          | IDENT ("(" (expr ("," expr)*)? ")")?
//!          | "(" expr ")"
//!          | ("+" | "-") factor
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::{TokenKind, TokenValue};
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point). Each call is one nesting
    /// level, which covers parentheses and call arguments.
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_sum)
    }

    /// Parse additive chain: term (('+'|'-') term)*
    fn parse_sum(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let loc = self.advance()?.location;
            let right = Box::new(self.parse_term()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (*, /)
    fn parse_term(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let loc = self.advance()?.location;
            let right = Box::new(self.parse_factor()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse factor: literals, identifiers, calls, grouping and unary signs
    fn parse_factor(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match (self.current.kind, &self.current.value) {
            (TokenKind::Number, TokenValue::Number(n)) => {
                let n = n.clone();
                self.advance()?;
                Ok(AstNode::NumberLiteral(n, loc))
            }
            (TokenKind::String, TokenValue::Str(s)) => {
                let s = s.clone();
                self.advance()?;
                Ok(AstNode::StringLiteral(s, loc))
            }
            (TokenKind::Boolean, TokenValue::Bool(b)) => {
                let b = *b;
                self.advance()?;
                Ok(AstNode::BoolLiteral(b, loc))
            }
            (TokenKind::Identifier, TokenValue::Str(name)) => {
                let name = name.clone();
                self.advance()?;

                if self.check(TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    return Ok(AstNode::FunctionCall {
                        name,
                        args,
                        location: loc,
                    });
                }

                Ok(AstNode::Identifier(name, loc))
            }
            (TokenKind::LParen, _) => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.eat(TokenKind::RParen)?;
                Ok(expr)
            }
            (TokenKind::Plus, _) | (TokenKind::Minus, _) => {
                let op = if self.check(TokenKind::Plus) {
                    UnOp::Plus
                } else {
                    UnOp::Neg
                };
                self.advance()?;
                let operand = Box::new(self.nested(Self::parse_factor)?);
                Ok(AstNode::UnaryOp {
                    op,
                    operand,
                    location: loc,
                })
            }
            _ => Err(ParseError::ExpectedExpression {
                found: self.current.to_string(),
                location: loc,
            }),
        }
    }

    /// Parse function call arguments: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        self.eat(TokenKind::LParen)?;
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.check(TokenKind::Comma) {
                self.advance()?;
                args.push(self.parse_expression()?);
            }
        }

        self.eat(TokenKind::RParen)?;
        Ok(args)
    }
}
