// ==============================================================================
// Pattern IR
// ==============================================================================
//
// The tree produced by the parser and read by the URL builder and the matcher.
// Nothing mutates a `Pattern` after `parse` returns it.

use std::fmt;

/// Constraint used by placeholders that do not declare one.
pub const DEFAULT_CONSTRAINT: &str = "[^/]+";

/// A parsed route pattern: the root of the IR tree.
///
/// ```rust
/// use named_routes::{Node, parse};
///
/// let pattern = parse("/users/{id}[/{action}]").unwrap();
/// assert_eq!(pattern.children().len(), 3);
/// assert!(matches!(pattern.children()[2], Node::Optional(_)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    children: Vec<Node>,
}

/// One node of a [`Pattern`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// Literal text, never empty.
    Static(String),
    /// A named, regex-constrained variable.
    Placeholder(Placeholder),
    /// A bracketed group rendered only when all of its placeholders have
    /// values.
    Optional(Vec<Node>),
}

/// A `{name}` or `{name:constraint}` placeholder.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placeholder {
    name: String,
    constraint: Option<String>,
}

impl Pattern {
    #[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
    pub(crate) const fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Top-level nodes in pattern order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Every placeholder in the tree, in pre-order, optional segments
    /// included.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        let mut out = Vec::new();
        collect_placeholders(&self.children, &mut out);
        out.into_iter()
    }

    /// Placeholder names in pre-order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.placeholders().map(Placeholder::name)
    }

    /// Whether the last top-level node is literal text ending in `/`, i.e.
    /// the pattern author asked for a trailing slash.
    #[must_use]
    pub fn ends_with_slash(&self) -> bool {
        matches!(self.children.last(), Some(Node::Static(value)) if value.ends_with('/'))
    }
}

fn collect_placeholders<'a>(nodes: &'a [Node], out: &mut Vec<&'a Placeholder>) {
    for node in nodes {
        match node {
            Node::Static(_) => {}
            Node::Placeholder(placeholder) => out.push(placeholder),
            Node::Optional(children) => collect_placeholders(children, out),
        }
    }
}

impl Placeholder {
    #[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
    pub(crate) const fn new(name: String, constraint: Option<String>) -> Self {
        Self { name, constraint }
    }

    /// The placeholder name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The constraint written in the pattern, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// The regex fragment this placeholder matches: its constraint, or
    /// [`DEFAULT_CONSTRAINT`].
    #[must_use]
    pub fn regex(&self) -> &str {
        self.constraint.as_deref().unwrap_or(DEFAULT_CONSTRAINT)
    }
}

// ==============================================================================
// Display — re-renders pattern syntax
// ==============================================================================

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.children.iter().try_for_each(|node| node.fmt(f))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.write_str(value),
            Self::Placeholder(placeholder) => placeholder.fmt(f),
            Self::Optional(children) => {
                f.write_str("[")?;
                children.iter().try_for_each(|node| node.fmt(f))?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{{{}:{constraint}}}", self.name),
            None => write!(f, "{{{}}}", self.name),
        }
    }
}
