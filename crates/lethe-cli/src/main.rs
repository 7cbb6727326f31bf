#![doc = include_str!("../README.md")]

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use lethe_highlight::{HighlightSpan, highlight};
use lethe_tokenizer::{Category, DynTokenize, Registry, TEMPLATE_GRAMMAR};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE_ERROR: i32 = 1;
const EXIT_IO_ERROR: i32 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = Command::new("lethe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal highlighter and token inspector for Lethe documents")
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("input")
                .help("Input file path (or \"-\" for stdin)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("grammar")
                .long("grammar")
                .short('g')
                .help("Registered grammar to tokenize with")
                .default_value(TEMPLATE_GRAMMAR),
        )
        .arg(
            Arg::new("plain")
                .long("plain")
                .help("Disable colors even when stdout is a terminal")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the classified spans of a document")
                .arg(
                    Arg::new("input")
                        .help("Input file path (or \"-\" for stdin)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("Registered grammar to tokenize with")
                        .default_value(TEMPLATE_GRAMMAR),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("One JSON object per span")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("grammars").about("List registered grammars and content types"))
        .get_matches();

    let result = match matches.subcommand() {
        Some(("tokens", sub)) => run_tokens(
            sub.get_one::<String>("input").expect("input is required"),
            sub.get_one::<String>("grammar").expect("grammar has a default"),
            sub.get_flag("json"),
        ),
        Some(("grammars", _)) => run_grammars(),
        _ => run_highlight(
            matches.get_one::<String>("input").expect("input is required"),
            matches
                .get_one::<String>("grammar")
                .expect("grammar has a default"),
            matches.get_flag("plain"),
        ),
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    UnknownGrammar(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::UnknownGrammar(_) => EXIT_USAGE_ERROR,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::UnknownGrammar(name) => {
                write!(f, "unknown grammar '{name}' (see `lethe grammars`)")
            }
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn run_highlight(input: &str, grammar: &str, plain: bool) -> Result<(), CliError> {
    let source = read_input(input)?;
    let tokenizer = resolve_grammar(grammar)?;
    if plain || !io::stdout().is_terminal() {
        print!("{source}");
    } else {
        let spans = highlight(&source, &tokenizer);
        print!("{}", paint(&source, &spans));
    }
    Ok(())
}

fn run_tokens(input: &str, grammar: &str, json: bool) -> Result<(), CliError> {
    let source = read_input(input)?;
    let tokenizer = resolve_grammar(grammar)?;
    for span in highlight(&source, &tokenizer) {
        println!("{}", format_span(&source, &span, json));
    }
    Ok(())
}

fn run_grammars() -> Result<(), CliError> {
    let registry = Registry::with_builtins();
    println!("grammars:");
    for name in registry.names() {
        println!("  {name}");
    }
    println!("content types:");
    for (label, name) in registry.content_types() {
        println!("  {label} -> {name}");
    }
    Ok(())
}

fn resolve_grammar(name: &str) -> Result<Arc<dyn DynTokenize>, CliError> {
    Registry::with_builtins()
        .get(name)
        .ok_or_else(|| CliError::UnknownGrammar(name.to_string()))
}

fn format_span(source: &str, span: &HighlightSpan, json: bool) -> String {
    let text = &source[span.start..span.end];
    if json {
        serde_json::json!({
            "start": span.start,
            "end": span.end,
            "category": span.category.as_str(),
            "text": text,
        })
        .to_string()
    } else {
        format!(
            "{:>5}..{:<5} {:<10} {:?}",
            span.start,
            span.end,
            span.category.as_str(),
            text
        )
    }
}

// ============================================================================
// I/O helpers
// ============================================================================

fn read_input(path: &str) -> Result<String, io::Error> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

// ============================================================================
// Terminal highlighting
// ============================================================================

/// ANSI color codes for the token categories
mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const COMMENT: &str = "\x1b[38;5;243m"; // Gray
    pub const DEF: &str = "\x1b[38;5;203m"; // Red
    pub const META: &str = "\x1b[38;5;75m"; // Blue
    pub const ATOM: &str = "\x1b[38;5;80m"; // Cyan
    pub const STRING: &str = "\x1b[38;5;214m"; // Orange
    pub const NUMBER: &str = "\x1b[38;5;141m"; // Purple
    pub const KEYWORD: &str = "\x1b[38;5;203m"; // Red
    pub const REFERENCE: &str = "\x1b[38;5;71m"; // Green
    pub const BRACKET: &str = "\x1b[38;5;220m"; // Yellow
}

fn color_for(category: Category) -> &'static str {
    match category {
        Category::Comment => ansi::COMMENT,
        Category::Def => ansi::DEF,
        Category::Meta => ansi::META,
        Category::Atom => ansi::ATOM,
        Category::String => ansi::STRING,
        Category::Number => ansi::NUMBER,
        Category::Keyword => ansi::KEYWORD,
        Category::Reference => ansi::REFERENCE,
        Category::Bracket => ansi::BRACKET,
    }
}

/// Wrap every span of `source` in its category's ANSI color.
fn paint(source: &str, spans: &[HighlightSpan]) -> String {
    if spans.is_empty() {
        return source.to_string();
    }

    let mut result = String::with_capacity(source.len() * 2);
    let mut last_end = 0;

    for span in spans {
        if span.start > last_end {
            result.push_str(&source[last_end..span.start]);
        }
        result.push_str(color_for(span.category));
        result.push_str(&source[span.start..span.end]);
        result.push_str(ansi::RESET);
        last_end = span.end;
    }

    if last_end < source.len() {
        result.push_str(&source[last_end..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lethe_tokenizer::BaseTokenizer;

    #[test]
    fn test_paint_produces_ansi_codes() {
        let source = "name: 1";
        let spans = highlight(source, &BaseTokenizer);
        let painted = paint(source, &spans);
        assert!(painted.contains("\x1b["));
        assert!(painted.contains(ansi::RESET));
    }

    #[test]
    fn test_paint_preserves_content() {
        let source = "name: 1\nflag: yes # note";
        let spans = highlight(source, &BaseTokenizer);
        let painted = paint(source, &spans);
        assert_eq!(strip_ansi_codes(&painted), source);
    }

    #[test]
    fn test_paint_empty_source() {
        assert_eq!(paint("", &[]), "");
    }

    #[test]
    fn test_format_span_text_mode() {
        let source = "a: 1";
        let spans = highlight(source, &BaseTokenizer);
        let line = format_span(source, &spans[0], false);
        assert!(line.contains("atom"));
        assert!(line.contains("\"a\""));
    }

    #[test]
    fn test_format_span_json_mode() {
        let source = "a: 1";
        let spans = highlight(source, &BaseTokenizer);
        let line = format_span(source, &spans[0], true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["category"], "atom");
        assert_eq!(value["text"], "a");
        assert_eq!(value["start"], 0);
        assert_eq!(value["end"], 1);
    }

    #[test]
    fn test_unknown_grammar_is_an_error() {
        let err = resolve_grammar("nope").err().unwrap();
        assert_eq!(err.exit_code(), EXIT_USAGE_ERROR);
    }

    /// Helper to strip ANSI escape codes for testing
    fn strip_ansi_codes(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until we find 'm' (end of ANSI sequence)
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }

        result
    }
}
