//! Compiler-style rendering of lex and parse errors
//!
//! ```text
//! parse error: expected 'then', found identifier 'x'
//!  --> greet.gb:3:10
//!   |
//! 3 | if ready x
//!   |          ^
//! ```

use crate::parser::{ErrorKind, ParseError};
use crossterm::style::Stylize;

/// Render `error` against the source it came from.
///
/// `color` wraps the header and caret in ANSI styling; pass `false` when the
/// output is not a terminal.
pub fn render(error: &ParseError, source: &str, file_name: &str, color: bool) -> String {
    let location = error.location();
    let label = match error.kind() {
        ErrorKind::Lex => "lex error",
        ErrorKind::Parse => "parse error",
    };

    // Lines and columns are 1-based; end-of-input errors may point one line
    // past the last line of the file.
    let src_line = source
        .lines()
        .nth(location.line.saturating_sub(1))
        .unwrap_or("");
    let gutter = location.line.to_string().len();
    // Tabs are copied so the caret lines up however the terminal expands them
    let width = location.column.saturating_sub(1);
    let mut padding: String = src_line
        .chars()
        .take(width)
        .map(|ch| if ch == '\t' { '\t' } else { ' ' })
        .collect();
    padding.push_str(&" ".repeat(width.saturating_sub(padding.chars().count())));

    let header = format!("{}: {}", label, error.message());
    let (header, caret) = if color {
        (header.red().bold().to_string(), "^".red().bold().to_string())
    } else {
        (header, "^".to_string())
    };

    [
        header,
        format!(
            "{:>w$}--> {}:{}:{}",
            "",
            file_name,
            location.line,
            location.column,
            w = gutter
        ),
        format!("{:>w$} |", "", w = gutter),
        format!("{} | {}", location.line, src_line),
        format!("{:>w$} | {}{}", "", padding, caret, w = gutter),
    ]
    .join("\n")
}
