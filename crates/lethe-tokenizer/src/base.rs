//! The base tokenizer for the YAML-like document grammar.

use tracing::trace;

use crate::{Category, LineStream, Tokenize};

/// Boolean-ish keywords recognized in value position.
const KEYWORDS: [&str; 6] = ["true", "false", "on", "off", "yes", "no"];

/// State the base tokenizer carries across scan calls and line boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// A key has been recognized on the current logical line.
    pub pair: bool,
    /// The next scan step sits at the start of a pair's value.
    pub pair_start: bool,
    /// Indentation column of the most recent key; block-literal bodies must
    /// be indented deeper than this to belong to it.
    pub key_col: i32,
    /// Nesting depth of inline flow mappings (`{ }`). May go negative on
    /// malformed input, which only switches the depth-gated rules off.
    pub inline_pairs: i32,
    /// Nesting depth of inline flow sequences (`[ ]`).
    pub inline_list: i32,
    /// Inside the body of a block literal (`|` or `>`).
    pub literal: bool,
    /// The previous character was an unconsumed backslash.
    pub escaped: bool,
}

/// The base tokenizer. Stateless itself; everything lives in [`ScanState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseTokenizer;

impl Tokenize for BaseTokenizer {
    type State = ScanState;

    fn start_state(&self) -> ScanState {
        ScanState::default()
    }

    fn scan(&self, stream: &mut LineStream<'_>, state: &mut ScanState) -> Option<Category> {
        let start = stream.pos();
        let category = scan_token(stream, state);
        trace!("base {:?}: {:?}", category, stream.slice(start));
        category
    }
}

fn scan_token(stream: &mut LineStream<'_>, state: &mut ScanState) -> Option<Category> {
    let ch = stream.peek();
    let esc = state.escaped;
    state.escaped = false;

    // A `#` opens a comment when it starts the line or follows whitespace.
    if ch == Some('#') && stream.prev().is_none_or(char::is_whitespace) {
        stream.skip_to_end();
        return Some(Category::Comment);
    }

    // Body of a block literal: swallow whole lines while they stay indented
    // deeper than the key that introduced the literal.
    if state.literal {
        if stream.indentation() as i32 > state.key_col {
            stream.skip_to_end();
            return Some(Category::String);
        }
        state.literal = false;
    }

    if stream.sol() {
        state.key_col = 0;
        state.pair = false;
        state.pair_start = false;
        // document boundary markers
        if stream.eat("---") || stream.eat("...") {
            return Some(Category::Def);
        }
        if eat_list_item(stream) {
            return Some(Category::Meta);
        }
    }

    if !state.pair && eat_key(stream) {
        state.pair = true;
        state.key_col = stream.indentation() as i32;
        return Some(Category::Atom);
    }

    if state.pair && stream.eat(":") {
        stream.eat_while(char::is_whitespace);
        state.pair_start = true;
        return Some(Category::Meta);
    }

    // Flow delimiters adjust the nesting counters even on unbalanced input;
    // a negative depth only disables the depth-gated rules below.
    match ch {
        Some('{') => {
            stream.advance();
            state.inline_pairs += 1;
            return Some(Category::Meta);
        }
        Some('}') => {
            stream.advance();
            state.inline_pairs -= 1;
            return Some(Category::Meta);
        }
        Some('[') => {
            stream.advance();
            state.inline_list += 1;
            return Some(Category::Meta);
        }
        Some(']') => {
            stream.advance();
            state.inline_list -= 1;
            return Some(Category::Meta);
        }
        _ => {}
    }

    if ch == Some(',') && !esc {
        if state.inline_list > 0 {
            stream.advance();
            return Some(Category::Meta);
        }
        if state.inline_pairs > 0 {
            // a new key is expected after the separator
            state.key_col = 0;
            state.pair = false;
            state.pair_start = false;
            stream.advance();
            return Some(Category::Meta);
        }
    }

    if state.pair_start {
        if eat_literal_introducer(stream) {
            state.literal = true;
            return Some(Category::Meta);
        }
        if eat_reference(stream) {
            return Some(Category::Reference);
        }
        if state.inline_pairs == 0 && eat_number(stream, false) {
            return Some(Category::Number);
        }
        if state.inline_pairs > 0 && eat_number(stream, true) {
            return Some(Category::Number);
        }
        if eat_keyword(stream) {
            return Some(Category::Keyword);
        }
    }

    // Nothing recognized: consume a single character and move on. This is
    // the totality guarantee; malformed input degrades to uncategorized
    // characters instead of an error.
    state.pair_start = false;
    state.escaped = ch == Some('\\');
    stream.advance();
    None
}

/// A block sequence item marker: optional whitespace, `-`, required
/// whitespace.
fn eat_list_item(stream: &mut LineStream<'_>) -> bool {
    let start = stream.pos();
    stream.eat_while(char::is_whitespace);
    if stream.eat("-") && stream.eat_while(char::is_whitespace) > 0 {
        return true;
    }
    stream.seek(start);
    false
}

/// A mapping key: optional whitespace, an identifier run, and a lookahead
/// for the `:` that must follow it. The `:` stays unconsumed so the pair
/// separator gets its own token.
fn eat_key(stream: &mut LineStream<'_>) -> bool {
    let start = stream.pos();
    stream.eat_while(char::is_whitespace);
    if stream.eat_while(is_ident) == 0 {
        stream.seek(start);
        return false;
    }
    let end = stream.pos();
    stream.eat_while(char::is_whitespace);
    let followed_by_colon = stream.peek() == Some(':');
    stream.seek(if followed_by_colon { end } else { start });
    followed_by_colon
}

/// A block-literal introducer in value position: `|` or `>` with optional
/// whitespace on both sides.
fn eat_literal_introducer(stream: &mut LineStream<'_>) -> bool {
    let start = stream.pos();
    stream.eat_while(char::is_whitespace);
    if stream.eat("|") || stream.eat(">") {
        stream.eat_while(char::is_whitespace);
        return true;
    }
    stream.seek(start);
    false
}

/// An anchor or alias in value position: `&name` / `*name`. The name is
/// matched greedily, then shrunk until it ends on a word boundary; a name
/// with no word characters at all is not a reference.
fn eat_reference(stream: &mut LineStream<'_>) -> bool {
    let start = stream.pos();
    stream.eat_while(char::is_whitespace);
    if !(stream.eat("&") || stream.eat("*")) {
        stream.seek(start);
        return false;
    }
    let run_start = stream.pos();
    stream.eat_while(is_ident);
    let run: Vec<char> = stream.slice(run_start).chars().collect();
    let after = stream.peek();
    for cut in (1..=run.len()).rev() {
        let next = if cut == run.len() {
            after
        } else {
            Some(run[cut])
        };
        // a word boundary sits between a word and a non-word character
        if is_word(run[cut - 1]) != next.is_some_and(is_word) {
            stream.seek(run_start + byte_len(&run[..cut]));
            return true;
        }
    }
    stream.seek(start);
    false
}

/// A numeric value: optional sign, a run of digits/`.`/`,`. Outside flow
/// mappings the number must reach the end of the line (one trailing
/// whitespace character allowed); inside, it must stop just before a `,`
/// or `}` so the separator keeps its own token.
fn eat_number(stream: &mut LineStream<'_>, in_flow: bool) -> bool {
    let start = stream.pos();
    stream.eat_while(char::is_whitespace);
    stream.eat("-");
    let run_start = stream.pos();
    if stream.eat_while(is_number_char) == 0 {
        stream.seek(start);
        return false;
    }

    if in_flow {
        // Greedy with backtracking: shrink the run until an optional single
        // whitespace character followed by `,` or `}` terminates it.
        let run: Vec<char> = stream.slice(run_start).chars().collect();
        for cut in (1..=run.len()).rev() {
            let cut_end = run_start + byte_len(&run[..cut]);
            if cut < run.len() {
                // the character after a shorter cut is a run character, and
                // of those only `,` can terminate the number
                if run[cut] == ',' {
                    stream.seek(cut_end);
                    return true;
                }
                continue;
            }
            stream.seek(cut_end);
            if stream.peek().is_some_and(char::is_whitespace) {
                stream.advance();
                if matches!(stream.peek(), Some(',' | '}')) {
                    return true;
                }
                stream.back_up(1);
            }
            if matches!(stream.peek(), Some(',' | '}')) {
                return true;
            }
        }
        stream.seek(start);
        false
    } else {
        if stream.is_eol() {
            return true;
        }
        if stream.peek().is_some_and(char::is_whitespace) {
            stream.advance();
            if stream.is_eol() {
                return true;
            }
        }
        stream.seek(start);
        false
    }
}

/// A boolean-ish keyword filling the rest of the line (a trailing whole
/// word: any other trailing text defeats the match).
fn eat_keyword(stream: &mut LineStream<'_>) -> bool {
    let rest = stream.remaining();
    if KEYWORDS.iter().any(|k| rest.eq_ignore_ascii_case(k)) {
        stream.skip_to_end();
        return true;
    }
    false
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ',')
}

fn byte_len(chars: &[char]) -> u32 {
    chars.iter().map(|c| c.len_utf8() as u32).sum()
}
