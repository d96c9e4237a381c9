//! Lexer (tokenizer) for GB source code
//!
//! Produces [`Token`]s on demand for the parser. Two constructs need
//! speculative matching:
//!
//! - `title'...'` / `text'...'` quoted literals, which look like identifiers
//!   until the quote is seen
//! - the `ts.windows` qualified call, which spans three raw lexemes
//!
//! Both save the read cursor before trying and restore it on a miss, so the
//! line and column bookkeeping never has to be recomputed.

use super::ast::{NumberValue, SourceLocation};
use log::trace;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    Boolean,
    Title,   // title'...'
    TextArg, // text'...'

    // Identifiers
    Identifier,

    // Keywords
    Var,
    Def,
    If,
    Elif,
    Else,
    Then,
    End,
    Loop,
    Times,
    Return,
    Window,
    Button,
    Input,
    Text,
    Container,

    // Host calls
    TsWindows, // ts.windows
    Tsdll,

    // Punctuation
    Equals,    // =
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Title => "title'...' literal",
            TokenKind::TextArg => "text'...' literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Var => "'var'",
            TokenKind::Def => "'def'",
            TokenKind::If => "'if'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::Then => "'then'",
            TokenKind::End => "'end'",
            TokenKind::Loop => "'loop'",
            TokenKind::Times => "'times'",
            TokenKind::Return => "'return'",
            TokenKind::Window => "'window'",
            TokenKind::Button => "'button'",
            TokenKind::Input => "'input'",
            TokenKind::Text => "'text'",
            TokenKind::Container => "'container'",
            TokenKind::TsWindows => "'ts.windows'",
            TokenKind::Tsdll => "'tsdll'",
            TokenKind::Equals => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

/// Literal payload carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Number(NumberValue),
    Str(String),
    Bool(bool),
}

/// A single token with its position in the source.
///
/// `offset` and `len` count characters, not bytes, so they line up with
/// `column`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub location: SourceLocation,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    /// Character offset one past the last character of this token.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Text payload of identifiers, keywords, strings and quoted literals.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, TokenValue::Str(name)) => {
                write!(f, "identifier '{}'", name)
            }
            (TokenKind::Number, TokenValue::Number(n)) => write!(f, "number {}", n),
            (TokenKind::String, TokenValue::Str(s)) => write!(f, "string \"{}\"", s),
            (TokenKind::Title, TokenValue::Str(s)) => write!(f, "title'{}'", s),
            (TokenKind::TextArg, TokenValue::Str(s)) => write!(f, "text'{}'", s),
            (TokenKind::Boolean, TokenValue::Bool(b)) => write!(f, "'{}'", b),
            (kind, _) => write!(f, "{}", kind),
        }
    }
}

/// What went wrong while scanning a token
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("unterminated string")]
    UnterminatedString,

    /// A `title'` or `text'` literal whose closing quote never appears
    #[error("unterminated {0} literal")]
    UnterminatedQuoted(&'static str),

    #[error("invalid number format: {0}")]
    InvalidNumber(String),
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Lex error at {location}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

impl LexError {
    fn new(kind: LexErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Reserved words, built once and shared by every lexer.
fn keywords() -> &'static FxHashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        [
            ("var", TokenKind::Var),
            ("def", TokenKind::Def),
            ("if", TokenKind::If),
            ("elif", TokenKind::Elif),
            ("else", TokenKind::Else),
            ("then", TokenKind::Then),
            ("end", TokenKind::End),
            ("loop", TokenKind::Loop),
            ("times", TokenKind::Times),
            ("return", TokenKind::Return),
            ("window", TokenKind::Window),
            ("button", TokenKind::Button),
            ("input", TokenKind::Input),
            ("text", TokenKind::Text),
            ("container", TokenKind::Container),
            ("true", TokenKind::Boolean),
            ("false", TokenKind::Boolean),
            ("tsdll", TokenKind::Tsdll),
        ]
        .into_iter()
        .collect()
    })
}

/// Read position of the lexer. Saved before a speculative match and
/// restored verbatim when the match fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Pull-based lexer for GB source code
pub struct Lexer {
    input: Vec<char>,
    cursor: Cursor,
    peeked: Option<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            cursor: Cursor {
                position: 0,
                line: 1,
                column: 1,
            },
            peeked: None,
        }
    }

    /// Return the next token, or the end-of-input token once the source is
    /// exhausted. Calling it again after `Eof` keeps returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan_token(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token, LexError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Tokenize the rest of the input. The returned vector always ends with
    /// an `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let start = self.cursor;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(self.make_token(TokenKind::Eof, TokenValue::None, start)),
        };

        if ch == 't' {
            if let Some(token) = self.quoted_literal(start)? {
                return Ok(token);
            }
        }

        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.identifier_or_keyword(start));
        }

        if ch.is_ascii_digit() || ch == '.' {
            return self.number_literal(start);
        }

        if ch == '"' {
            return self.string_literal(start);
        }

        self.advance();
        let kind = match ch {
            '=' => TokenKind::Equals,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            _ => {
                return Err(LexError::new(
                    LexErrorKind::InvalidCharacter(ch),
                    start.location(),
                ))
            }
        };

        Ok(self.make_token(kind, TokenValue::None, start))
    }

    /// Try `title'...'` and `text'...'`. Returns `Ok(None)` with the cursor
    /// back at `start` when neither prefix is directly followed by a quote.
    fn quoted_literal(&mut self, start: Cursor) -> Result<Option<Token>, LexError> {
        for (prefix, kind) in [("title", TokenKind::Title), ("text", TokenKind::TextArg)] {
            let matched = self.consume_word(prefix);

            if matched && self.peek() == Some('\'') {
                self.advance(); // opening quote
                let mut body = String::new();
                loop {
                    match self.advance() {
                        Some('\'') => {
                            return Ok(Some(self.make_token(kind, TokenValue::Str(body), start)));
                        }
                        Some(ch) => body.push(ch),
                        None => {
                            return Err(LexError::new(
                                LexErrorKind::UnterminatedQuoted(prefix),
                                start.location(),
                            ));
                        }
                    }
                }
            }

            if matched {
                trace!(
                    "'{}' at {} is not followed by a quote, rolling back",
                    prefix,
                    start.location()
                );
            }
            self.restore(start);
        }

        Ok(None)
    }

    /// Parse identifier, keyword or the `ts.windows` qualified call
    fn identifier_or_keyword(&mut self, start: Cursor) -> Token {
        let ident = self.identifier_run();

        if ident == "ts" && self.peek() == Some('.') {
            let after_ts = self.cursor;
            self.advance(); // '.'
            let suffix = self.identifier_run();
            if suffix == "windows" {
                return self.make_token(
                    TokenKind::TsWindows,
                    TokenValue::Str("ts.windows".to_string()),
                    start,
                );
            }
            trace!(
                "'ts.{}' is not a qualified call, rolling back to {}",
                suffix,
                after_ts.location()
            );
            self.restore(after_ts);
        }

        let kind = keywords()
            .get(ident.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        let value = match kind {
            TokenKind::Boolean => TokenValue::Bool(ident == "true"),
            _ => TokenValue::Str(ident),
        };

        self.make_token(kind, value, start)
    }

    /// Parse numeric literal: digits with at most one decimal point
    fn number_literal(&mut self, start: Cursor) -> Result<Token, LexError> {
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let invalid = || {
            LexError::new(
                LexErrorKind::InvalidNumber(text.clone()),
                start.location(),
            )
        };

        let value = match text.matches('.').count() {
            0 => match text.parse::<i64>() {
                Ok(n) => NumberValue::Integer(n),
                Err(_) => NumberValue::BigInteger(text.clone()),
            },
            1 => NumberValue::Float(text.parse::<f64>().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };

        Ok(self.make_token(TokenKind::Number, TokenValue::Number(value), start))
    }

    /// Parse string literal. Only `\"` and `\\` are escapes; any other
    /// backslash pair is kept as written.
    fn string_literal(&mut self, start: Cursor) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut string = String::new();
        let unterminated =
            || LexError::new(LexErrorKind::UnterminatedString, start.location());

        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('"') => string.push('"'),
                    Some('\\') => string.push('\\'),
                    Some(other) => {
                        string.push('\\');
                        string.push(other);
                    }
                    None => return Err(unterminated()),
                },
                Some(ch) => string.push(ch),
                None => return Err(unterminated()),
            }
        }

        Ok(self.make_token(TokenKind::String, TokenValue::Str(string), start))
    }

    /// Skip whitespace and `//` line comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn identifier_run(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Consume `word` if the input continues with it. On a partial match the
    /// matched characters stay consumed; callers restore the cursor.
    fn consume_word(&mut self, word: &str) -> bool {
        for expected in word.chars() {
            if self.peek() != Some(expected) {
                return false;
            }
            self.advance();
        }
        true
    }

    fn make_token(&self, kind: TokenKind, value: TokenValue, start: Cursor) -> Token {
        Token {
            kind,
            value,
            location: start.location(),
            offset: start.position,
            len: self.cursor.position - start.position,
        }
    }

    fn restore(&mut self, saved: Cursor) {
        self.cursor = saved;
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.cursor.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.cursor.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor.position += 1;

        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }

        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("var age = 25"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("= + - * / ( ) , : ;"),
            vec![
                TokenKind::Equals,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let tokens = Lexer::new("end End tsdll true False").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::End);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Tsdll);
        assert_eq!(tokens[3].value, TokenValue::Bool(true));
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("var x = 1 // trailing\n// whole line\nreturn x"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Return,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("var a\n  = 1").tokenize().unwrap();
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(1, 5));
        assert_eq!(tokens[2].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[3].location, SourceLocation::new(2, 5));
        assert_eq!(tokens[4].location, SourceLocation::new(2, 6));
    }

    #[test]
    fn test_number_classification() {
        let tokens = Lexer::new("5 5.0 .5 5.").tokenize().unwrap();
        assert_eq!(tokens[0].value, TokenValue::Number(NumberValue::Integer(5)));
        assert_eq!(tokens[1].value, TokenValue::Number(NumberValue::Float(5.0)));
        assert_eq!(tokens[2].value, TokenValue::Number(NumberValue::Float(0.5)));
        assert_eq!(tokens[3].value, TokenValue::Number(NumberValue::Float(5.0)));
    }

    #[test]
    fn test_number_with_two_dots() {
        let err = lex_error("5.0.0");
        assert_eq!(err.kind, LexErrorKind::InvalidNumber("5.0.0".to_string()));
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_integer_wider_than_i64() {
        let tokens = Lexer::new("99999999999999999999 9223372036854775807")
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens[0].value,
            TokenValue::Number(NumberValue::BigInteger("99999999999999999999".to_string()))
        );
        assert_eq!(
            tokens[1].value,
            TokenValue::Number(NumberValue::Integer(i64::MAX))
        );
        assert_eq!(tokens[0].to_string(), "number 99999999999999999999");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""say \"hi\" \\ and \n""#).tokenize().unwrap();
        assert_eq!(
            tokens[0].value,
            TokenValue::Str(r#"say "hi" \ and \n"#.to_string())
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_error("var s = \"open");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.location, SourceLocation::new(1, 9));
    }

    #[test]
    fn test_quoted_literals() {
        let tokens = Lexer::new("title'Hi there' text'C:\\temp, \"ok\"'").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Title);
        assert_eq!(tokens[0].text(), Some("Hi there"));
        // No escape processing inside quoted literals
        assert_eq!(tokens[1].kind, TokenKind::TextArg);
        assert_eq!(tokens[1].text(), Some("C:\\temp, \"ok\""));
    }

    #[test]
    fn test_quoted_prefix_rolls_back() {
        let tokens = Lexer::new("titlework text tit").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text(), Some("titlework"));
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[1].location, SourceLocation::new(1, 11));
        assert_eq!(tokens[2].text(), Some("tit"));
        assert_eq!(tokens[2].location, SourceLocation::new(1, 16));
    }

    #[test]
    fn test_unterminated_quoted_literal() {
        let err = lex_error("ts.windows(title'never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedQuoted("title"));
        assert_eq!(err.location, SourceLocation::new(1, 12));
    }

    #[test]
    fn test_ts_windows() {
        let tokens = Lexer::new("ts.windows(").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::TsWindows);
        assert_eq!(tokens[0].len, 10);
        assert_eq!(tokens[1].kind, TokenKind::LParen);
        assert_eq!(tokens[1].location, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_ts_rollback_leaves_dot_for_number_rule() {
        let mut lexer = Lexer::new("ts.foo()");
        let ts = lexer.next_token().unwrap();
        assert_eq!(ts.kind, TokenKind::Identifier);
        assert_eq!(ts.text(), Some("ts"));
        assert_eq!(ts.len, 2);

        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidNumber(".".to_string()));
        assert_eq!(err.location, SourceLocation::new(1, 3));
    }

    #[test]
    fn test_invalid_character() {
        let err = lex_error("var x = 1 @");
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter('@'));
        assert_eq!(err.location, SourceLocation::new(1, 11));
        assert_eq!(
            err.to_string(),
            "Lex error at line 1, column 11: invalid character '@'"
        );
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("add(1)");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        assert_eq!(lexer.peek_token().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.peek_token().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}
