//! Statement parsing implementation
//!
//! This module handles parsing of all GB statement types:
//!
//! - Declarations: `var x = expr`, `def NAME = expr`, `def f(a, b) ... end`
//! - Control flow: `if`/`elif`/`else`, counted and conditional `loop`
//! - `return expr`
//! - Host calls: `ts.windows(title'...', text'...')` and
//!   `tsdll("lib", "fn", args...)`
//! - Expression statements: calls used for their side effects
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | def_decl | if_stmt | loop_stmt | return_stmt
//!             | notify_call | foreign_call | element | expr
//! var_decl  ::= "var" IDENT "=" expr
//! def_decl  ::= "def" IDENT "=" expr
//!             | "def" IDENT "(" (IDENT ("," IDENT)*)? ")" statement* "end"
//! if_stmt   ::= "if" expr "then" statement*
//!               ("elif" expr "then" statement*)*
//!               ("else" statement*)? "end"
//! loop_stmt ::= "loop" "times" expr "then" statement* "end"
//!             | "loop" expr "then" statement* "end"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{into_text, ParseError, Parser};
use log::trace;

impl Parser {
    /// Parse a statement, dispatching on the current token
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        match self.current.kind {
            TokenKind::Var => self.parse_var_declaration(),
            TokenKind::Def => self.parse_def(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Loop => self.parse_loop_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::TsWindows => self.parse_notify_call(),
            TokenKind::Tsdll => self.parse_foreign_call(),
            TokenKind::Window
            | TokenKind::Button
            | TokenKind::Input
            | TokenKind::Text
            | TokenKind::Container => self.parse_element(),
            _ => self.parse_expression(),
        }
    }

    /// Parse variable declaration: var name = expr
    fn parse_var_declaration(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let name = self.expect_identifier("variable name")?;
        self.eat(TokenKind::Equals)?;
        let value = Box::new(self.parse_expression()?);

        Ok(AstNode::VarDecl {
            name,
            value,
            location: loc,
        })
    }

    /// Parse `def`: a function definition when `(` follows the name with no
    /// space in between, otherwise a constant
    fn parse_def(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        if self.check(TokenKind::Identifier) && self.next_is_adjacent(TokenKind::LParen)? {
            trace!("def at {} is a function definition", loc);
            return self.parse_function_definition(loc);
        }
        trace!("def at {} is a constant", loc);

        let name = self.expect_identifier("constant name")?;
        self.eat(TokenKind::Equals)?;
        let value = Box::new(self.parse_expression()?);

        Ok(AstNode::ConstDecl {
            name,
            value,
            location: loc,
        })
    }

    /// Parse function definition: name(params) body end
    fn parse_function_definition(&mut self, loc: SourceLocation) -> Result<AstNode, ParseError> {
        let name = self.expect_identifier("function name")?;

        self.eat(TokenKind::LParen)?;
        let params = self.parse_parameter_list()?;
        self.eat(TokenKind::RParen)?;

        let body = self.parse_block("def", loc, &[TokenKind::End])?;
        self.eat(TokenKind::End)?;

        Ok(AstNode::FunctionDef {
            name,
            params,
            body,
            location: loc,
        })
    }

    /// Parse parameter list: name, name, ...
    fn parse_parameter_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();

        if self.check(TokenKind::RParen) {
            return Ok(params);
        }

        params.push(self.expect_identifier("parameter name")?);
        while self.check(TokenKind::Comma) {
            self.advance()?;
            params.push(self.expect_identifier("parameter name")?);
        }

        Ok(params)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;
        let expr = Box::new(self.parse_expression()?);

        Ok(AstNode::Return { expr, location: loc })
    }

    /// Parse if statement with any number of elif arms and an optional else
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;
        let arm_end = [TokenKind::Elif, TokenKind::Else, TokenKind::End];

        let condition = Box::new(self.parse_expression()?);
        self.eat(TokenKind::Then)?;
        let then_branch = self.parse_block("if", loc, &arm_end)?;

        let mut elif_clauses = Vec::new();
        while self.check(TokenKind::Elif) {
            let elif_loc = self.advance()?.location;
            let condition = self.parse_expression()?;
            self.eat(TokenKind::Then)?;
            let body = self.parse_block("if", loc, &arm_end)?;

            elif_clauses.push(ElifClause {
                condition,
                body,
                location: elif_loc,
            });
        }

        let else_branch = if self.check(TokenKind::Else) {
            self.advance()?;
            Some(self.parse_block("if", loc, &[TokenKind::End])?)
        } else {
            None
        };

        self.eat(TokenKind::End)?;

        Ok(AstNode::If {
            condition,
            then_branch,
            elif_clauses,
            else_branch,
            location: loc,
        })
    }

    /// Parse loop statement: `loop times N then` or `loop cond then`
    fn parse_loop_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let kind = if self.check(TokenKind::Times) {
            self.advance()?;
            LoopKind::Counted {
                count: Box::new(self.parse_expression()?),
            }
        } else {
            LoopKind::Conditional {
                condition: Box::new(self.parse_expression()?),
            }
        };

        self.eat(TokenKind::Then)?;
        let body = self.parse_block("loop", loc, &[TokenKind::End])?;
        self.eat(TokenKind::End)?;

        Ok(AstNode::Loop {
            kind,
            body,
            location: loc,
        })
    }

    /// Parse notification call: ts.windows(title'...', text'...')
    fn parse_notify_call(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        self.eat(TokenKind::LParen)?;
        let title = self.expect_token(TokenKind::Title, "title'...' argument in ts.windows call")?;
        self.eat(TokenKind::Comma)?;
        let text = self.expect_token(TokenKind::TextArg, "text'...' argument in ts.windows call")?;
        self.eat(TokenKind::RParen)?;

        Ok(AstNode::NotifyCall {
            title: into_text(title),
            text: into_text(text),
            location: loc,
        })
    }

    /// Parse foreign call: tsdll("library", "function", args...)
    fn parse_foreign_call(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        self.eat(TokenKind::LParen)?;
        let library = self.expect_string("library name string in tsdll call")?;
        self.eat(TokenKind::Comma)?;
        let function = self.expect_string("function name string in tsdll call")?;

        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            self.eat(TokenKind::Comma)?;
            args.push(self.parse_expression()?);
        }
        self.eat(TokenKind::RParen)?;

        Ok(AstNode::ForeignCall {
            library,
            function,
            args,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> AstNode {
        let mut parser = Parser::new(source).unwrap();
        let mut program = parser.parse_program().unwrap();
        assert_eq!(program.nodes.len(), 1, "expected one node for {:?}", source);
        program.nodes.remove(0)
    }

    fn parse_err(source: &str) -> ParseError {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap_err()
    }

    #[test]
    fn test_def_constant_vs_function() {
        assert!(matches!(parse_one("def PI = 3.14159"), AstNode::ConstDecl { .. }));
        assert!(matches!(parse_one("def f() end"), AstNode::FunctionDef { .. }));
    }

    #[test]
    fn test_def_requires_adjacent_paren() {
        // With a space the name is read as a constant, which then wants '='
        let err = parse_err("def f (a) end");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "'='"
        ));
    }

    #[test]
    fn test_if_with_elif_and_else() {
        let node = parse_one("if a then b elif c then d e elif f then else g end");
        match node {
            AstNode::If {
                then_branch,
                elif_clauses,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(elif_clauses.len(), 2);
                assert_eq!(elif_clauses[0].body.len(), 2);
                assert!(elif_clauses[1].body.is_empty());
                assert_eq!(else_branch.map(|b| b.len()), Some(1));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else() {
        match parse_one("if x then end") {
            AstNode::If { else_branch, .. } => assert!(else_branch.is_none()),
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_elif_after_else_is_rejected() {
        let err = parse_err("if a then else b elif c then end");
        assert!(matches!(err, ParseError::ExpectedExpression { ref found, .. } if found == "'elif'"));
    }

    #[test]
    fn test_unclosed_elif_body_reports_if() {
        let err = parse_err("if a then\n  x\nelif b then\n  y\n");
        assert_eq!(
            err,
            ParseError::UnclosedBlock {
                construct: "if",
                opened_at: SourceLocation::new(1, 1),
                location: SourceLocation::new(5, 1),
            }
        );
    }

    #[test]
    fn test_unclosed_else_body_reports_if() {
        let err = parse_err("var z = 0\nif a then\n  x\nelse\n  y");
        assert_eq!(
            err,
            ParseError::UnclosedBlock {
                construct: "if",
                opened_at: SourceLocation::new(2, 1),
                location: SourceLocation::new(5, 4),
            }
        );
    }

    #[test]
    fn test_conditional_loop() {
        match parse_one("loop running then tick() end") {
            AstNode::Loop {
                kind: LoopKind::Conditional { condition },
                body,
                ..
            } => {
                assert!(matches!(*condition, AstNode::Identifier(ref n, _) if n == "running"));
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected conditional loop, got {:?}", other),
        }
    }

    #[test]
    fn test_notify_call_requires_title_first() {
        let err = parse_err("ts.windows(text'a', title'b')");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, ref found, .. }
                if expected == "title'...' argument in ts.windows call" && found == "text'a'"
        ));
    }

    #[test]
    fn test_foreign_call() {
        match parse_one(r#"tsdll("user32.dll", "MessageBeep", 0, x + 1)"#) {
            AstNode::ForeignCall {
                library,
                function,
                args,
                ..
            } => {
                assert_eq!(library, "user32.dll");
                assert_eq!(function, "MessageBeep");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected foreign call, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_call_without_args() {
        match parse_one(r#"tsdll("kernel32.dll", "Beep")"#) {
            AstNode::ForeignCall { args, .. } => assert!(args.is_empty()),
            other => panic!("Expected foreign call, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_call_args_need_commas() {
        let err = parse_err(r#"tsdll("a", "b" 1)"#);
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "','"));
    }
}
