//! Token categories for the Lethe tokenizers.

/// The semantic class assigned to a scanned span.
///
/// Categories are consumed downstream for presentation. [`Category::as_str`]
/// yields the paint-class label a host keys its theme on; the label set is
/// closed and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `# ...` running to the end of the line
    Comment,
    /// Document boundary markers: `---` and `...`
    Def,
    /// Structural punctuation: pair separators, flow delimiters, list-item
    /// markers, block-literal introducers, and the `${` template introducer
    Meta,
    /// A mapping key, or body text inside a `${...}` template expression
    Atom,
    /// A line belonging to the body of a block literal
    String,
    /// Numeric value
    Number,
    /// Boolean-ish keyword value: `true`, `false`, `on`, `off`, `yes`, `no`
    Keyword,
    /// Anchor or alias reference: `&name` / `*name`
    Reference,
    /// An open or close brace of a `${...}` template group
    Bracket,
}

impl Category {
    /// The presentation label for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Comment => "comment",
            Category::Def => "def",
            Category::Meta => "meta",
            Category::Atom => "atom",
            Category::String => "string",
            Category::Number => "number",
            Category::Keyword => "keyword",
            Category::Reference => "variable-2",
            Category::Bracket => "bracket",
        }
    }

    /// Whether this category marks a scalar value rather than structure.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Category::String | Category::Number | Category::Keyword | Category::Reference
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
