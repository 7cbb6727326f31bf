//! Drives a tokenizer over a whole document and collects highlight spans.
//!
//! The tokenizers in `lethe-tokenizer` see one line at a time; this crate
//! owns the driving loop: it splits a document into lines, feeds each line
//! to [`Tokenize::scan`] until exhaustion, and maps the per-line token
//! positions back to byte offsets in the full source. [`Session`] adds
//! per-line state checkpoints so a single line can be re-scanned without
//! replaying the whole document.

use lethe_tokenizer::{Category, LineStream, Tokenize};
use tracing::trace;

/// A classified byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte offset where the span starts.
    pub start: usize,
    /// Byte offset where the span ends (exclusive).
    pub end: usize,
    /// The category assigned to the span.
    pub category: Category,
}

/// Tokenize `source` from a fresh state and collect one span per
/// categorized token. Uncategorized spans are omitted; line terminators
/// are never part of a span.
pub fn highlight<T: Tokenize>(source: &str, tokenizer: &T) -> Vec<HighlightSpan> {
    let mut state = tokenizer.start_state();
    let mut spans = Vec::new();
    for (line_start, line) in lines_with_offsets(source) {
        scan_line(tokenizer, line, line_start, &mut state, &mut spans);
    }
    trace!("highlighted {} bytes into {} spans", source.len(), spans.len());
    spans
}

/// Scan one line, pushing a span for every categorized token.
fn scan_line<T: Tokenize>(
    tokenizer: &T,
    line: &str,
    line_start: usize,
    state: &mut T::State,
    spans: &mut Vec<HighlightSpan>,
) {
    let mut stream = LineStream::new(line);
    while !stream.is_eol() {
        let start = stream.pos();
        let category = tokenizer.scan(&mut stream, state);
        debug_assert!(stream.pos() > start, "scan must make progress");
        if let Some(category) = category {
            spans.push(HighlightSpan {
                start: line_start + start as usize,
                end: line_start + stream.pos() as usize,
                category,
            });
        }
    }
}

/// `(byte offset, content)` for each line of `source`; terminators are
/// excluded from the content but counted in the offsets.
fn lines_with_offsets(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source.split('\n').scan(0usize, |offset, raw| {
        let start = *offset;
        *offset += raw.len() + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        Some((start, line))
    })
}

/// A tokenization session over one document revision, with a state
/// checkpoint at the start of every line.
///
/// Checkpoints are filled lazily in line order: asking for line `n` scans
/// forward from the last cached line. Re-scanning line `n` afterwards
/// costs only that one line, which is what an interactive host needs when
/// repainting the viewport.
pub struct Session<'src, T: Tokenize> {
    tokenizer: T,
    /// `(byte offset, content)` of each line.
    lines: Vec<(usize, &'src str)>,
    /// State at the start of each line; `checkpoints[0]` is the fresh
    /// start state, `checkpoints[i]` the state after scanning lines
    /// `0..i`.
    checkpoints: Vec<T::State>,
}

impl<'src, T: Tokenize> Session<'src, T> {
    pub fn new(tokenizer: T, source: &'src str) -> Self {
        let lines = lines_with_offsets(source).collect::<Vec<_>>();
        let start = tokenizer.start_state();
        Self {
            tokenizer,
            lines,
            checkpoints: vec![start],
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Spans for one line, computed from that line's checkpoint. Offsets
    /// are relative to the whole document.
    pub fn spans_for_line(&mut self, index: usize) -> Vec<HighlightSpan> {
        let Some(&(line_start, line)) = self.lines.get(index) else {
            return Vec::new();
        };
        let mut state = self.state_at(index);
        let mut spans = Vec::new();
        scan_line(&self.tokenizer, line, line_start, &mut state, &mut spans);
        spans
    }

    /// Spans for the whole document, line by line through the checkpoint
    /// machinery.
    pub fn spans(&mut self) -> Vec<HighlightSpan> {
        (0..self.line_count())
            .flat_map(|index| self.spans_for_line(index))
            .collect()
    }

    /// The state at the start of line `index`, scanning forward from the
    /// nearest cached checkpoint as needed.
    fn state_at(&mut self, index: usize) -> T::State {
        while self.checkpoints.len() <= index {
            let line_no = self.checkpoints.len() - 1;
            let (_, line) = self.lines[line_no];
            trace!("extending checkpoints past line {line_no}");
            let mut state = self.checkpoints[line_no].clone();
            let mut stream = LineStream::new(line);
            while !stream.is_eol() {
                self.tokenizer.scan(&mut stream, &mut state);
            }
            self.checkpoints.push(state);
        }
        self.checkpoints[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lethe_tokenizer::{BaseTokenizer, Overlay, TemplateTokenizer};

    fn render(source: &str, spans: &[HighlightSpan]) -> String {
        spans
            .iter()
            .map(|s| format!("{}:{:?}", s.category, &source[s.start..s.end]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_spans_cover_multiple_lines() {
        let source = "a: 1\nb: yes";
        let spans = highlight(source, &BaseTokenizer);
        insta::assert_snapshot!(
            render(source, &spans),
            @r#"atom:"a" meta:": " number:"1" atom:"b" meta:": " keyword:"yes""#
        );
    }

    #[test]
    fn test_offsets_account_for_line_terminators() {
        let source = "a: 1\nb: 2";
        let spans = highlight(source, &BaseTokenizer);
        // "b" sits at byte 5, after the newline
        let b = spans.iter().find(|s| &source[s.start..s.end] == "b").unwrap();
        assert_eq!(b.start, 5);
        assert_eq!(b.category, Category::Atom);
    }

    #[test]
    fn test_crlf_terminators() {
        let source = "a: 1\r\nb: 2";
        let spans = highlight(source, &BaseTokenizer);
        let b = spans.iter().find(|s| &source[s.start..s.end] == "b").unwrap();
        assert_eq!(b.start, 6);
    }

    #[test]
    fn test_overlay_spans() {
        let source = "k: ${v}";
        let tokenizer = Overlay::new(BaseTokenizer, TemplateTokenizer);
        let spans = highlight(source, &tokenizer);
        insta::assert_snapshot!(
            render(source, &spans),
            @r#"atom:"k" meta:": " meta:"$" bracket:"{" atom:"v" bracket:"}""#
        );
    }

    #[test]
    fn test_session_matches_straight_highlight() {
        let source = "top: |\n  body line\nflag: no\nref: &a\nlist: [1\\, 2]\nt: ${x}";
        let tokenizer = Overlay::new(BaseTokenizer, TemplateTokenizer);
        let direct = highlight(source, &tokenizer);
        let mut session = Session::new(tokenizer, source);
        assert_eq!(session.spans(), direct);
    }

    #[test]
    fn test_session_rescans_single_lines_out_of_order() {
        let source = "a: |\n  one\n  two\nb: 3";
        let mut session = Session::new(BaseTokenizer, source);
        assert_eq!(session.line_count(), 4);

        // jump straight to the last line, then revisit an earlier one
        let last = session.spans_for_line(3);
        assert_eq!(last.len(), 3);
        let body = session.spans_for_line(1);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].category, Category::String);

        // rescans are idempotent
        assert_eq!(session.spans_for_line(3), last);
    }

    #[test]
    fn test_out_of_range_line_is_empty() {
        let mut session = Session::new(BaseTokenizer, "a: 1");
        assert!(session.spans_for_line(7).is_empty());
    }
}
