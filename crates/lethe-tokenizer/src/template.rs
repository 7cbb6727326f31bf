//! The template-bracket tokenizer that drives the `${...}` overlay.

use tracing::trace;

use crate::{Category, LineStream, Tokenize};

/// What an open brace meant when it was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceTag {
    /// A `${` introducer whose `{` has not been classified yet.
    Dollar,
    /// An open template brace.
    Bracket,
    /// A brace that belongs to the underlying grammar; pushed and popped
    /// only to keep the nesting depth honest.
    Foreign,
}

/// State for the template-bracket tokenizer.
///
/// Every push for an open brace is balanced by exactly one pop on the
/// matching close; popping an empty stack means "no matching open" and is
/// never a fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateState {
    /// Stack of meanings for the currently-open braces.
    pub tags: Vec<BraceTag>,
    /// Number of open template brace groups.
    pub nob: u32,
}

/// Recognizes `${`, the braces it opens, and the text between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTokenizer;

impl Tokenize for TemplateTokenizer {
    type State = TemplateState;

    fn start_state(&self) -> TemplateState {
        TemplateState::default()
    }

    fn scan(&self, stream: &mut LineStream<'_>, state: &mut TemplateState) -> Option<Category> {
        let start = stream.pos();
        let category = scan_token(stream, state);
        trace!("template {:?}: {:?}", category, stream.slice(start));
        category
    }
}

fn scan_token(stream: &mut LineStream<'_>, state: &mut TemplateState) -> Option<Category> {
    if stream.eat("${") {
        state.tags.push(BraceTag::Dollar);
        // leave the `{` for the brace rules on the next call, so its
        // classification can depend on what preceded it
        stream.back_up(1);
        return Some(Category::Meta);
    }

    if stream.eat("{") {
        return match state.tags.pop() {
            Some(BraceTag::Dollar) => {
                state.tags.push(BraceTag::Bracket);
                state.nob += 1;
                Some(Category::Bracket)
            }
            lhs => {
                // not ours: keep whatever was there and record a foreign
                // brace so the matching `}` pops the right entry
                if let Some(lhs) = lhs {
                    state.tags.push(lhs);
                }
                state.tags.push(BraceTag::Foreign);
                None
            }
        };
    }

    if stream.eat("}") {
        return match state.tags.pop() {
            Some(BraceTag::Bracket) => {
                state.nob = state.nob.saturating_sub(1);
                Some(Category::Bracket)
            }
            // a dangling introducer echoes its own category back
            Some(BraceTag::Dollar) => Some(Category::Meta),
            Some(BraceTag::Foreign) | None => None,
        };
    }

    // Plain text: consume up to, never past, the next construct of ours.
    while stream.advance().is_some() {
        if stream.looking_at("${") || stream.looking_at("{") || stream.looking_at("}") {
            break;
        }
    }

    if state.nob > 0 {
        Some(Category::Atom)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<(Option<Category>, String)> {
        let tokenizer = TemplateTokenizer;
        let mut state = tokenizer.start_state();
        scan_with(source, &mut state)
    }

    fn scan_with(source: &str, state: &mut TemplateState) -> Vec<(Option<Category>, String)> {
        let tokenizer = TemplateTokenizer;
        let mut out = Vec::new();
        for line in source.lines() {
            let mut stream = LineStream::new(line);
            while !stream.is_eol() {
                let start = stream.pos();
                let category = tokenizer.scan(&mut stream, state);
                out.push((category, stream.slice(start).to_string()));
            }
        }
        out
    }

    #[test]
    fn test_template_expression() {
        assert_eq!(
            scan("${x}"),
            vec![
                (Some(Category::Meta), "$".to_string()),
                (Some(Category::Bracket), "{".to_string()),
                (Some(Category::Atom), "x".to_string()),
                (Some(Category::Bracket), "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_outside_templates_is_uncategorized() {
        assert_eq!(scan("plain text"), vec![(None, "plain text".to_string())]);
    }

    #[test]
    fn test_foreign_braces_pass_through() {
        assert_eq!(
            scan("{a}"),
            vec![
                (None, "{".to_string()),
                (None, "a".to_string()),
                (None, "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_foreign_brace_inside_template() {
        // the inner brace pair belongs to the underlying grammar but must
        // still nest correctly
        assert_eq!(
            scan("${a{b}c}"),
            vec![
                (Some(Category::Meta), "$".to_string()),
                (Some(Category::Bracket), "{".to_string()),
                (Some(Category::Atom), "a".to_string()),
                (None, "{".to_string()),
                (Some(Category::Atom), "b".to_string()),
                (None, "}".to_string()),
                (Some(Category::Atom), "c".to_string()),
                (Some(Category::Bracket), "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_close_is_tolerated() {
        assert_eq!(
            scan("}x"),
            vec![(None, "}".to_string()), (None, "x".to_string())]
        );
    }

    #[test]
    fn test_template_state_spans_lines() {
        let tokenizer = TemplateTokenizer;
        let mut state = tokenizer.start_state();
        let tokens = scan_with("${\nx}", &mut state);
        assert_eq!(
            tokens,
            vec![
                (Some(Category::Meta), "$".to_string()),
                (Some(Category::Bracket), "{".to_string()),
                (Some(Category::Atom), "x".to_string()),
                (Some(Category::Bracket), "}".to_string()),
            ]
        );
        assert_eq!(state.nob, 0);
        assert!(state.tags.is_empty());
    }

    #[test]
    fn test_stack_balance() {
        let tokenizer = TemplateTokenizer;
        let mut state = tokenizer.start_state();
        scan_with("${a} {b} ${c${d}}", &mut state);
        assert_eq!(state.nob, 0);
        assert!(state.tags.is_empty());
    }
}
