//! An incremental tokenizer for Lethe documents
//!
//! Lethe is a YAML-like document language with an embedded `${...}`
//! templating syntax. This crate classifies source text into token
//! categories one span at a time: the base grammar and the template
//! grammar are independent tokenizers, and [`Overlay`] composes any two
//! tokenizers over the same character stream.

mod category;
pub use category::Category;

mod stream;
pub use stream::LineStream;

mod tokenize;
pub use tokenize::Tokenize;

mod base;
pub use base::{BaseTokenizer, ScanState};

mod template;
pub use template::{BraceTag, TemplateState, TemplateTokenizer};

mod overlay;
pub use overlay::{Overlay, OverlayState};

mod registry;
pub use registry::{
    BASE_GRAMMAR, BoxedState, CONTENT_TYPE, DynTokenize, OverlayConfig, Registry, TEMPLATE_GRAMMAR,
};
