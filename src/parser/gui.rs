//! GUI-element parsing implementation
//!
//! The layout sublanguage describes plugin windows declaratively:
//!
//! ```text
//! element   ::= window | button | input | text | container
//! window    ::= "window" STRING expr expr element* "end"
//! button    ::= "button" STRING (IDENT statement* "end")?
//! input     ::= "input" STRING STRING
//! text      ::= "text" STRING
//! container ::= "container" element* "end"
//! ```
//!
//! Only elements may appear directly inside `window` and `container`; a
//! button handler body holds ordinary statements.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a GUI element
    pub(crate) fn parse_element(&mut self) -> Result<AstNode, ParseError> {
        match self.current.kind {
            TokenKind::Window => self.parse_window(),
            TokenKind::Button => self.parse_button(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Text => self.parse_text(),
            TokenKind::Container => self.parse_container(),
            _ => Err(ParseError::ExpectedElement {
                found: self.current.to_string(),
                location: self.current_location(),
            }),
        }
    }

    /// Parse child elements up to (not including) the closing `end`
    fn parse_element_block(
        &mut self,
        construct: &'static str,
        opened_at: SourceLocation,
    ) -> Result<Vec<AstNode>, ParseError> {
        self.nested(|parser| {
            let mut children = Vec::new();

            while !parser.check(TokenKind::End) {
                if parser.is_at_end() {
                    return Err(ParseError::UnclosedBlock {
                        construct,
                        opened_at,
                        location: parser.current_location(),
                    });
                }
                children.push(parser.parse_element()?);
            }

            Ok(children)
        })
    }

    /// Parse window: window "title" width height children end
    fn parse_window(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let title = self.expect_string("window title string")?;
        let width = Box::new(self.parse_expression()?);
        let height = Box::new(self.parse_expression()?);

        let children = self.parse_element_block("window", loc)?;
        self.eat(TokenKind::End)?;

        Ok(AstNode::Window {
            title,
            width,
            height,
            children,
            location: loc,
        })
    }

    /// Parse button with optional event handler: button "text" [onClick ... end]
    fn parse_button(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let text = self.expect_string("button text string")?;

        let (event, handler) = if self.check(TokenKind::Identifier) {
            let event = self.expect_identifier("event handler name")?;
            let handler = self.parse_block("button", loc, &[TokenKind::End])?;
            self.eat(TokenKind::End)?;
            (Some(event), handler)
        } else {
            (None, Vec::new())
        };

        Ok(AstNode::Button {
            text,
            event,
            handler,
            location: loc,
        })
    }

    /// Parse input: input "name" "default"
    fn parse_input(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let name = self.expect_string("input name string")?;
        let default = self.expect_string("input default value string")?;

        Ok(AstNode::Input {
            name,
            default,
            location: loc,
        })
    }

    /// Parse text: text "content"
    fn parse_text(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;
        let content = self.expect_string("text content string")?;

        Ok(AstNode::Text {
            content,
            location: loc,
        })
    }

    /// Parse container: container children end
    fn parse_container(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.advance()?.location;

        let children = self.parse_element_block("container", loc)?;
        self.eat(TokenKind::End)?;

        Ok(AstNode::Container {
            children,
            location: loc,
        })
    }
}
