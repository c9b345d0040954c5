// ==============================================================================
// Pattern Parser
// ==============================================================================
//
// Single left-to-right scan over the pattern. Each `[` recurses into a new
// `sequence` call that returns at its matching `]`, so the nesting lives on
// the call stack rather than in a shared depth counter. Placeholder bodies are
// scanned separately with their own brace depth, since constraints may carry
// regex quantifiers such as `{1,3}`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    ast::{Node, Pattern, Placeholder},
    constraint,
    error::ParseError,
    matcher::{self, Matcher},
};

/// Where optional segments may appear in a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionalPlacement {
    /// Optional segments may nest and appear anywhere; brackets only need to
    /// balance.
    #[default]
    Anywhere,
    /// Once an optional segment closes, only further `]` may follow, so
    /// `/a[/b]/c` is rejected with [`ParseError::OptionalMisplaced`].
    TrailingOnly,
}

/// A configurable pattern parser.
///
/// ```rust
/// use named_routes::{OptionalPlacement, ParseError, Parser};
///
/// let strict = Parser::new().optional_placement(OptionalPlacement::TrailingOnly);
/// assert!(strict.parse("/users[/{id}[/{name}]]").is_ok());
/// assert!(matches!(
///     strict.parse("/users[/{id}]/edit"),
///     Err(ParseError::OptionalMisplaced { .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    placement: OptionalPlacement,
}

impl Parser {
    /// A parser using [`OptionalPlacement::Anywhere`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            placement: OptionalPlacement::Anywhere,
        }
    }

    /// Select the optional-segment placement policy.
    #[must_use]
    pub const fn optional_placement(mut self, placement: OptionalPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Parse and validate `pattern`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first structural problem
    /// found. No partial tree is ever returned.
    pub fn parse(&self, pattern: &str) -> Result<Pattern, ParseError> {
        let result = Scanner {
            src: pattern,
            pos: 0,
            placement: self.placement,
        }
        .sequence(None)
        .map(Pattern::new)
        .and_then(|parsed| validate(&parsed).map(|()| parsed));

        match &result {
            Ok(parsed) => tracing::debug!(
                pattern,
                placeholders = parsed.placeholders().count(),
                "parsed route pattern"
            ),
            Err(error) => tracing::debug!(pattern, %error, "rejected route pattern"),
        }

        result
    }
}

/// Parse `pattern` with the default [`Parser`].
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse(pattern: &str) -> Result<Pattern, ParseError> {
    Parser::new().parse(pattern)
}

// ==============================================================================
// Scanner
// ==============================================================================

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    placement: OptionalPlacement,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Parses nodes up to the end of input, or, inside an optional segment
    /// opened at byte `open`, up to and including its closing `]`.
    fn sequence(&mut self, open: Option<usize>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            let start = self.pos;
            self.pos += ch.len_utf8();

            match ch {
                '{' => {
                    flush(&mut text, &mut nodes);
                    nodes.push(Node::Placeholder(self.placeholder(start)?));
                }
                '[' => {
                    flush(&mut text, &mut nodes);
                    let children = self.sequence(Some(start))?;
                    if children.is_empty() {
                        return Err(ParseError::EmptyOptionalSegment {
                            position: self.pos - 1,
                        });
                    }
                    nodes.push(Node::Optional(children));
                    self.check_placement()?;
                }
                ']' if open.is_none() => {
                    return Err(ParseError::MismatchedBrackets { position: start });
                }
                ']' => {
                    flush(&mut text, &mut nodes);
                    return Ok(nodes);
                }
                _ => text.push(ch),
            }
        }

        if let Some(position) = open {
            return Err(ParseError::MismatchedBrackets { position });
        }

        flush(&mut text, &mut nodes);
        Ok(nodes)
    }

    /// Under [`OptionalPlacement::TrailingOnly`], an optional segment that
    /// just closed may only be followed by more closing brackets.
    fn check_placement(&self) -> Result<(), ParseError> {
        match (self.placement, self.peek()) {
            (OptionalPlacement::TrailingOnly, Some(next)) if next != ']' => {
                Err(ParseError::OptionalMisplaced { position: self.pos })
            }
            _ => Ok(()),
        }
    }

    /// Reads a placeholder body after the `{` at byte `open`, through its
    /// matching `}`.
    fn placeholder(&mut self, open: usize) -> Result<Placeholder, ParseError> {
        let body_start = self.pos;
        let mut depth = 0_usize;
        let mut escaped = false;

        for (offset, ch) in self.src[body_start..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }

            match ch {
                '\\' => escaped = true,
                '{' => depth += 1,
                '}' if depth == 0 => {
                    self.pos = body_start + offset + 1;
                    return placeholder_from_body(&self.src[body_start..body_start + offset]);
                }
                '}' => depth -= 1,
                _ => {}
            }
        }

        Err(ParseError::UnterminatedPlaceholder { position: open })
    }
}

fn flush(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Static(std::mem::take(text)));
    }
}

/// Splits `name:constraint` on the first `:`.
fn placeholder_from_body(body: &str) -> Result<Placeholder, ParseError> {
    let (name, constraint) = match body.split_once(':') {
        Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
        None => (body.trim(), None),
    };

    if !is_valid_name(name) {
        return Err(ParseError::InvalidPlaceholderName {
            name: name.to_owned(),
        });
    }

    let constraint = constraint
        .filter(|constraint| !constraint.is_empty())
        .map(str::to_owned);

    Ok(Placeholder::new(name.to_owned(), constraint))
}

/// `[a-zA-Z_][a-zA-Z0-9_-]*`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

// ==============================================================================
// Validation
// ==============================================================================

fn validate(pattern: &Pattern) -> Result<(), ParseError> {
    let mut names = HashSet::new();
    let mut group_names = HashSet::new();

    for placeholder in pattern.placeholders() {
        let name = placeholder.name();
        if !names.insert(name) {
            return Err(ParseError::DuplicatePlaceholder {
                name: name.to_owned(),
            });
        }

        let Some(constraint) = placeholder.constraint() else {
            continue;
        };

        if constraint::first_capturing_group(constraint).is_some() {
            return Err(ParseError::CapturingGroupInConstraint {
                name: name.to_owned(),
                constraint: constraint.to_owned(),
            });
        }

        for group in constraint::named_groups(constraint) {
            let reason = if group.starts_with(matcher::GROUP_PREFIX) {
                format!("group name `{group}` is reserved")
            } else if !group_names.insert(group) {
                format!("group name `{group}` is used more than once")
            } else {
                continue;
            };
            return Err(ParseError::InvalidConstraint {
                name: name.to_owned(),
                reason,
            });
        }

    }

    // Constraints are only known to be usable once the whole matcher compiles.
    Matcher::new(pattern).map(drop)
}
