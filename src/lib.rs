//! # Introduction
//!
//! `gblang` is the front end of GB, the small scripting language used to
//! write editor plugins. It turns plugin source text into an AST, or reports
//! the first lex or parse error with its line and column.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → (tokens on demand) → Parser → AST
//! ```
//!
//! 1. [`parser`]: lexer, AST model, recursive-descent parser and the
//!    [`parse`] / [`validate`] entry points.
//! 2. [`diagnostics`]: renders an error against its source line, the way
//!    the `gblang` binary prints it.
//!
//! ## Language summary
//!
//! Declarations: `var`, `def` (constants and functions).
//! Control flow: `if/elif/else`, `loop times N` and `loop <condition>`,
//! `return`.
//! Host calls: `ts.windows(title'..', text'..')`, `tsdll("lib", "fn", ...)`.
//! GUI layout: `window`, `button`, `input`, `text`, `container`.
//!
//! ```
//! let nodes = gblang::parse("var age = 25").unwrap();
//! assert_eq!(nodes.len(), 1);
//!
//! let report = gblang::validate("var x =");
//! assert!(!report.valid);
//! ```

pub mod diagnostics;
pub mod parser;

pub use parser::{parse, validate, Validation};
