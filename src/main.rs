// gblang: command-line front end for the GB plugin language

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use log::{debug, info};

use gblang::diagnostics;
use gblang::parser::lexer::{Lexer, TokenValue};
use gblang::parser::{ParseError, Parser};

/// Check, inspect and tokenize GB plugin scripts
#[derive(ClapParser, Debug)]
#[command(name = "gblang", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one or more files; exits non-zero if any fails
    Check {
        /// Source files (`-` reads stdin)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse a file and print its AST
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the token stream of a file
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let color = !cli.no_color && io::stderr().is_terminal();

    let result = match &cli.command {
        Command::Check { files } => check(files, color),
        Command::Ast { file } => ast(file, color),
        Command::Tokens { file } => tokens(file, color),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read a source file, or stdin for `-`
fn read_source(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    fs::read_to_string(path).map_err(|e| {
        io::Error::new(e.kind(), format!("cannot read '{}': {}", path.display(), e))
    })
}

fn report(error: &ParseError, source: &str, path: &Path, color: bool) {
    let name = path.display().to_string();
    eprintln!("{}", diagnostics::render(error, source, &name, color));
}

fn check(files: &[PathBuf], color: bool) -> io::Result<bool> {
    let mut all_ok = true;

    for path in files {
        let source = match read_source(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error: {}", e);
                all_ok = false;
                continue;
            }
        };
        debug!("checking {}", path.display());

        match gblang::parse(&source) {
            Ok(nodes) => {
                info!("{}: {} top-level nodes", path.display(), nodes.len());
                println!("ok: {}", path.display());
            }
            Err(e) => {
                report(&e, &source, path, color);
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}

fn ast(path: &Path, color: bool) -> io::Result<bool> {
    let source = read_source(path)?;

    let program = match Parser::new(&source).and_then(|mut parser| parser.parse_program()) {
        Ok(program) => program,
        Err(e) => {
            report(&e, &source, path, color);
            return Ok(false);
        }
    };

    for node in &program.nodes {
        println!("{:#?}", node);
    }
    Ok(true)
}

fn tokens(path: &Path, color: bool) -> io::Result<bool> {
    let source = read_source(path)?;

    let tokens = match Lexer::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            report(&ParseError::from(e), &source, path, color);
            return Ok(false);
        }
    };

    for token in &tokens {
        let value = match &token.value {
            TokenValue::None => String::new(),
            TokenValue::Number(n) => n.to_string(),
            TokenValue::Str(s) => format!("{:?}", s),
            TokenValue::Bool(b) => b.to_string(),
        };
        println!(
            "{:>4}:{:<4} {:<20} {}",
            token.location.line,
            token.location.column,
            format!("{:?}", token.kind),
            value
        );
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_continues_past_unreadable_file() {
        let files = [
            PathBuf::from("demos/does-not-exist.gb"),
            PathBuf::from("demos/greeter.gb"),
        ];
        assert!(!check(&files, false).unwrap());
    }

    #[test]
    fn test_check_accepts_valid_files() {
        let files = [
            PathBuf::from("demos/greeter.gb"),
            PathBuf::from("demos/calculator.gb"),
        ];
        assert!(check(&files, false).unwrap());
    }
}
