//! Composition of two tokenizers over one character stream.

use tracing::trace;

use crate::{Category, LineStream, Tokenize};

/// A tokenizer layered over another.
///
/// Both sides advance over the same characters with their own token
/// boundaries. Each composed token ends at the nearer of the two
/// frontiers, and the overlay's category wins whenever it produced one
/// for the span; neither grammar knows the other exists.
///
/// `Overlay` implements [`Tokenize`] itself, so overlays stack to any
/// depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<U, O> {
    under: U,
    over: O,
}

impl<U, O> Overlay<U, O> {
    /// Layer `over` on top of `under`.
    pub fn new(under: U, over: O) -> Self {
        Self { under, over }
    }
}

/// Carried state for [`Overlay`]: the two wrapped states plus each side's
/// per-line scan frontier and pending category.
#[derive(Debug, Clone)]
pub struct OverlayState<US, OS> {
    under: US,
    over: OS,
    under_pos: u32,
    over_pos: u32,
    under_cur: Option<Category>,
    over_cur: Option<Category>,
}

impl<U: Tokenize, O: Tokenize> Tokenize for Overlay<U, O> {
    type State = OverlayState<U::State, O::State>;

    fn start_state(&self) -> Self::State {
        OverlayState {
            under: self.under.start_state(),
            over: self.over.start_state(),
            under_pos: 0,
            over_pos: 0,
            under_cur: None,
            over_cur: None,
        }
    }

    fn scan(&self, stream: &mut LineStream<'_>, state: &mut Self::State) -> Option<Category> {
        let start = stream.pos();

        // A fresh line, or a host rescan from an earlier position, makes
        // the recorded frontiers stale; restart both sides at the cursor.
        if stream.sol() || state.under_pos.min(state.over_pos) < start {
            state.under_pos = start;
            state.over_pos = start;
        }

        if start == state.under_pos {
            state.under_cur = self.under.scan(stream, &mut state.under);
            state.under_pos = stream.pos();
            stream.seek(start);
        }

        if start == state.over_pos {
            state.over_cur = self.over.scan(stream, &mut state.over);
            state.over_pos = stream.pos();
        }

        // The composed token may not cross either side's token boundary;
        // the side that is ahead keeps its pending category for the
        // following calls.
        stream.seek(state.under_pos.min(state.over_pos));

        let category = state.over_cur.or(state.under_cur);
        trace!("overlay {:?}: {:?}", category, stream.slice(start));
        category
    }
}
