// ==============================================================================
// URL Builder
// ==============================================================================
//
// Renders a parsed pattern plus parameter values into a concrete URL. Optional
// segments are all-or-nothing: if any placeholder directly inside one is
// missing, the whole segment is dropped. Placeholder values are
// percent-encoded so that `/`, `?` and `%` survive a trip through the
// matcher. Parameters that no rendered placeholder consumed are appended as a
// query string.

use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::ast::{Node, Pattern};

/// Characters escaped in placeholder values and query pairs: everything
/// except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ==============================================================================
// Params
// ==============================================================================

/// An insertion-ordered map of parameter names to string values.
///
/// Used both as builder input and for the path and query parameters of a
/// [`RouteMatch`](crate::RouteMatch). Values are stringified on insert.
///
/// ```rust
/// use named_routes::Params;
///
/// let params = Params::new().with("id", 123).with("tab", "posts");
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, String>);

impl Params {
    /// An empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert or replace a value. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) -> Option<String> {
        self.0.insert(key.into(), value.to_string())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// The value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Flatten any serializable struct or map into parameters.
    ///
    /// `None` fields are skipped; numbers and booleans are stringified.
    ///
    /// # Errors
    ///
    /// Fails for values `serde_urlencoded` cannot express as flat key/value
    /// pairs, such as nested structs.
    pub fn from_serialize<T>(value: &T) -> Result<Self, serde_urlencoded::ser::Error>
    where
        T: Serialize + ?Sized,
    {
        serde_urlencoded::to_string(value).map(|encoded| Self::from_query(&encoded))
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// Keys seen more than once keep their last value.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_or_else(
            |error| {
                tracing::debug!(query, %error, "could not decode query string");
                Self::new()
            },
            |pairs| pairs.into_iter().collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Params
where
    K: Into<String>,
    V: fmt::Display,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
    K: Into<String>,
    V: fmt::Display,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ==============================================================================
// build
// ==============================================================================

/// Render `pattern` with `params` into a URL.
///
/// ```rust
/// use named_routes::{Params, build, parse};
///
/// let pattern = parse("/users/{id}[/{action}]").unwrap();
///
/// let url = build(&pattern, &Params::from([("id", "7"), ("page", "2")]));
/// assert_eq!(url, "/users/7?page=2");
/// ```
#[must_use]
pub fn build(pattern: &Pattern, params: &Params) -> String {
    let mut rendered = String::new();
    let mut consumed = HashSet::new();
    render(pattern.children(), params, &mut rendered, &mut consumed);

    let mut url = collapse_slashes(&rendered);
    if url.len() > 1 && url.ends_with('/') && !pattern.ends_with_slash() {
        url.pop();
    }
    if url.is_empty() {
        url.push('/');
    }

    let query = params
        .iter()
        .filter(|(key, _)| !consumed.contains(key))
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query);
    }

    url
}

fn render<'a>(nodes: &'a [Node], params: &Params, out: &mut String, consumed: &mut HashSet<&'a str>) {
    for node in nodes {
        match node {
            Node::Static(value) => out.push_str(value),
            Node::Placeholder(placeholder) => {
                if let Some(value) = filled(params, placeholder.name()) {
                    out.extend(utf8_percent_encode(value, COMPONENT));
                    consumed.insert(placeholder.name());
                }
            }
            Node::Optional(children) => {
                let complete = children.iter().all(|child| match child {
                    Node::Placeholder(placeholder) => filled(params, placeholder.name()).is_some(),
                    Node::Static(_) | Node::Optional(_) => true,
                });
                if complete {
                    render(children, params, out, consumed);
                }
            }
        }
    }
}

/// A parameter counts as present only when it is non-empty.
fn filled<'p>(params: &'p Params, name: &str) -> Option<&'p str> {
    params.get(name).filter(|value| !value.is_empty())
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}
