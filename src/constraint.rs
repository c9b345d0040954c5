// ==============================================================================
// Constraint Scanner
// ==============================================================================
//
// A placeholder's constraint is embedded inside the matcher's own capture
// group, so it must not open capturing groups of its own. This tokenizer walks
// the constraint, tracking escapes and character classes, and classifies every
// `(` it finds as a group opener.

/// What kind of group a `(` opens.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GroupKind<'a> {
    /// `( ... )`: a plain capturing group.
    Capturing,
    /// `(?:`, lookarounds, inline flags, atomic groups, `(*VERB)`.
    NonCapturing,
    /// `(?<name>`, `(?P<name>` or `(?'name'`.
    Named(&'a str),
}

/// A group opener found in a constraint.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Group<'a> {
    /// Byte offset of the `(`.
    pub(crate) offset: usize,
    pub(crate) kind: GroupKind<'a>,
}

/// Scans `constraint` and returns every group opener outside character
/// classes and escapes, in order.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
pub(crate) fn groups(constraint: &str) -> Vec<Group<'_>> {
    let bytes = constraint.as_bytes();
    let mut found = Vec::new();
    let mut in_class = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // Skip the escaped character, whatever it is.
                i += 2;
                continue;
            }
            b'[' if !in_class => {
                in_class = true;
                i += 1;
                // `[]...]` and `[^]...]` start with a literal `]`.
                if bytes.get(i) == Some(&b'^') {
                    i += 1;
                }
                if bytes.get(i) == Some(&b']') {
                    i += 1;
                }
                continue;
            }
            b']' if in_class => in_class = false,
            b'(' if !in_class => found.push(Group {
                offset: i,
                kind: classify(&constraint[i + 1..]),
            }),
            _ => {}
        }
        i += 1;
    }

    found
}

/// Classifies a group by the text right after its `(`.
fn classify(rest: &str) -> GroupKind<'_> {
    let named = rest
        .strip_prefix("?P<")
        .map(|tail| (tail, '>'))
        .or_else(|| {
            rest.strip_prefix("?<")
                .filter(|tail| !tail.starts_with(['=', '!']))
                .map(|tail| (tail, '>'))
        })
        .or_else(|| rest.strip_prefix("?'").map(|tail| (tail, '\'')));

    if let Some((tail, terminator)) = named {
        return tail
            .split_once(terminator)
            .map_or(GroupKind::NonCapturing, |(name, _)| GroupKind::Named(name));
    }

    if rest.starts_with(['?', '*']) {
        GroupKind::NonCapturing
    } else {
        GroupKind::Capturing
    }
}

/// Byte offset of the first plain capturing group in `constraint`, if any.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
pub(crate) fn first_capturing_group(constraint: &str) -> Option<usize> {
    groups(constraint)
        .into_iter()
        .find(|group| group.kind == GroupKind::Capturing)
        .map(|group| group.offset)
}

/// Names of the named groups declared inside `constraint`.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
pub(crate) fn named_groups(constraint: &str) -> Vec<&str> {
    groups(constraint)
        .into_iter()
        .filter_map(|group| match group.kind {
            GroupKind::Named(name) => Some(name),
            GroupKind::Capturing | GroupKind::NonCapturing => None,
        })
        .collect()
}
