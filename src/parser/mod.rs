//! GB source code parser
//!
//! This module transforms GB plugin scripts into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens, pulled on demand)
//! - [`parse`]: Parser state, helpers and [`ParseError`]
//! - `statements`, `expressions`, `gui`: the grammar, as `impl Parser` blocks
//! - [`ast`]: AST node definitions
//!
//! # Entry points
//!
//! [`parse()`] returns the top-level nodes or the first error. [`validate()`]
//! never fails; it folds the error into a [`Validation`] report.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with one token of lookahead. There is no
//! error recovery: the first lex or parse error aborts and no partial AST is
//! returned.

pub mod ast;
mod expressions;
mod gui;
pub mod lexer;
pub mod parse;
mod statements;

use log::debug;

pub use ast::{AstNode, Program, SourceLocation};
pub use parse::{ErrorKind, ParseError, Parser};

/// Outcome of [`validate()`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Empty when valid, otherwise exactly one message (the first error).
    pub errors: Vec<String>,
}

/// Parse a complete source string into its top-level statements and GUI
/// elements, in source order.
pub fn parse(source: &str) -> Result<Vec<AstNode>, ParseError> {
    debug!("parsing {} bytes of source", source.len());

    let program = Parser::new(source)
        .and_then(|mut parser| parser.parse_program())
        .map_err(|err| {
            debug!("parse failed: {}", err);
            err
        })?;

    debug!("parsed {} top-level nodes", program.nodes.len());
    Ok(program.nodes)
}

/// Check a source string without handing back the AST.
pub fn validate(source: &str) -> Validation {
    match parse(source) {
        Ok(_) => Validation {
            valid: true,
            errors: Vec::new(),
        },
        Err(err) => Validation {
            valid: false,
            errors: vec![err.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            CAPTURED.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    #[test]
    fn test_parse_logs_failure() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Debug);

        let err = parse("var logged_failure =").unwrap_err();
        let expected = format!("parse failed: {}", err);
        assert!(CAPTURED.lock().unwrap().contains(&expected));
    }

    #[test]
    fn test_validate_ok() {
        let report = validate("var age = 25\ndef PI = 3.14159");
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validate_folds_parse_error() {
        let report = validate("var x =");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Parse error at line 1, column 8: expected expression, found end of input"
                .to_string()]
        );
    }

    #[test]
    fn test_validate_folds_lex_error() {
        let report = validate("var n = 1.2.3");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Lex error at line 1, column 9: invalid number format: 1.2.3".to_string()]
        );
    }

    #[test]
    fn test_parse_keeps_source_order() {
        let nodes = parse("var a = 1\ntext \"t\"\nf()").unwrap();
        assert!(matches!(nodes[0], AstNode::VarDecl { .. }));
        assert!(matches!(nodes[1], AstNode::Text { .. }));
        assert!(matches!(nodes[2], AstNode::FunctionCall { .. }));
    }
}
