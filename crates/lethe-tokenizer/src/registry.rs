//! Grammar registration: names, content-type labels, and a type-erased
//! scan interface so registered grammars compose with overlays at runtime.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{BaseTokenizer, Category, LineStream, Overlay, TemplateTokenizer, Tokenize};

/// Name of the bare document grammar.
pub const BASE_GRAMMAR: &str = "lethe-base";
/// Name of the document grammar with the template overlay applied.
pub const TEMPLATE_GRAMMAR: &str = "lethe";
/// Content-type label hosts use to select the default grammar.
pub const CONTENT_TYPE: &str = "text/x-lethe";

trait ErasedState: Any {
    fn clone_box(&self) -> Box<dyn ErasedState>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: Clone + 'static> ErasedState for S {
    fn clone_box(&self) -> Box<dyn ErasedState> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Opaque carried state for a type-erased tokenizer.
pub struct BoxedState(Box<dyn ErasedState>);

impl Clone for BoxedState {
    fn clone(&self) -> Self {
        BoxedState(self.0.clone_box())
    }
}

impl std::fmt::Debug for BoxedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedState(..)")
    }
}

/// Object-safe form of [`Tokenize`], implemented for every tokenizer with
/// a `'static` state. Registered grammars are held behind
/// `Arc<dyn DynTokenize>`, which implements [`Tokenize`] again so an
/// erased grammar can serve as the backdrop of an [`Overlay`].
pub trait DynTokenize: Send + Sync {
    fn start_state_dyn(&self) -> BoxedState;
    fn scan_dyn(&self, stream: &mut LineStream<'_>, state: &mut BoxedState) -> Option<Category>;
}

impl<T> DynTokenize for T
where
    T: Tokenize + Send + Sync,
    T::State: 'static,
{
    fn start_state_dyn(&self) -> BoxedState {
        BoxedState(Box::new(self.start_state()))
    }

    fn scan_dyn(&self, stream: &mut LineStream<'_>, state: &mut BoxedState) -> Option<Category> {
        let state = state
            .0
            .as_any_mut()
            .downcast_mut::<T::State>()
            .expect("scan_dyn called with state from a different tokenizer");
        self.scan(stream, state)
    }
}

impl Tokenize for Arc<dyn DynTokenize> {
    type State = BoxedState;

    fn start_state(&self) -> BoxedState {
        self.as_ref().start_state_dyn()
    }

    fn scan(&self, stream: &mut LineStream<'_>, state: &mut BoxedState) -> Option<Category> {
        self.as_ref().scan_dyn(stream, state)
    }
}

/// Configuration for wiring the template overlay onto a backdrop grammar.
#[derive(Debug, Clone, Default)]
pub struct OverlayConfig {
    /// Name of the grammar the overlay paints over; the base grammar when
    /// unset.
    pub backdrop: Option<String>,
}

/// Named grammars and the content-type labels that select them.
#[derive(Default)]
pub struct Registry {
    grammars: HashMap<String, Arc<dyn DynTokenize>>,
    content_types: HashMap<String, String>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in grammars: the bare document grammar
    /// and the template overlay over its default backdrop.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BASE_GRAMMAR, BaseTokenizer);
        let overlay = registry
            .overlay(&OverlayConfig::default())
            .expect("base grammar is registered");
        registry.register(TEMPLATE_GRAMMAR, overlay);
        registry.register_content_type(CONTENT_TYPE, TEMPLATE_GRAMMAR);
        registry
    }

    /// Register a grammar under `name`, replacing any previous holder.
    pub fn register<T>(&mut self, name: &str, tokenizer: T)
    where
        T: DynTokenize + 'static,
    {
        self.grammars.insert(name.to_string(), Arc::new(tokenizer));
    }

    /// Associate a content-type label with a registered grammar name.
    pub fn register_content_type(&mut self, label: &str, grammar: &str) {
        self.content_types
            .insert(label.to_string(), grammar.to_string());
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DynTokenize>> {
        self.grammars.get(name).cloned()
    }

    pub fn get_by_content_type(&self, label: &str) -> Option<Arc<dyn DynTokenize>> {
        self.content_types.get(label).and_then(|name| self.get(name))
    }

    /// Registered grammar names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered `(content type, grammar name)` pairs, sorted by label.
    pub fn content_types(&self) -> Vec<(&str, &str)> {
        let mut labels: Vec<(&str, &str)> = self
            .content_types
            .iter()
            .map(|(l, g)| (l.as_str(), g.as_str()))
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Build a template overlay over the configured backdrop grammar.
    /// Returns `None` when the backdrop name is not registered.
    pub fn overlay(
        &self,
        config: &OverlayConfig,
    ) -> Option<Overlay<Arc<dyn DynTokenize>, TemplateTokenizer>> {
        let backdrop = config.backdrop.as_deref().unwrap_or(BASE_GRAMMAR);
        let under = self.get(backdrop)?;
        Some(Overlay::new(under, TemplateTokenizer))
    }
}
