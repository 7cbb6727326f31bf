//! The scan interface shared by every tokenizer in this crate.

use crate::{Category, LineStream};

/// A tokenizer that classifies one span per call over a per-line stream.
///
/// The host owns the stream and the state: it calls [`Tokenize::scan`]
/// until the line is exhausted, then hands the same state to the next
/// line. Cloning the state at a line boundary is the host's checkpoint
/// mechanism for re-tokenizing from the middle of a document.
///
/// Implementations must be total and make progress: any input, however
/// malformed, consumes at least one character per call (when the line is
/// not already exhausted) and returns either a [`Category`] or `None` for
/// an uncategorized span.
pub trait Tokenize {
    /// Context carried across scan calls and line boundaries.
    type State: Clone;

    /// The state a fresh tokenization session starts from.
    fn start_state(&self) -> Self::State;

    /// Advance over the next span and classify it.
    fn scan(&self, stream: &mut LineStream<'_>, state: &mut Self::State) -> Option<Category>;
}
