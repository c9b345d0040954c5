// ==============================================================================
// Matcher
// ==============================================================================
//
// Compiles a parsed pattern into an anchored `fancy_regex::Regex` and extracts
// parameters from candidate URLs. Constraints may use lookaround and atomic
// groups, which is why the backtracking engine is used here. Placeholder names
// may contain `-`, which is not legal in regex group names, so every
// placeholder gets an index-based group name and the matcher keeps the mapping
// back to the placeholder name.

use fancy_regex::Regex;
use http::Uri;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::{
    ast::{Node, Pattern, Placeholder},
    build::Params,
    error::ParseError,
};

/// Prefix of the matcher's internal group names. Constraints may not declare
/// named groups starting with it.
#[allow(clippy::redundant_pub_crate)] // Explicit crate visibility on private-module item.
pub(crate) const GROUP_PREFIX: &str = "__nr";

/// The parameters extracted from a matching URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    /// Percent-decoded placeholder values. Placeholders inside optional
    /// segments that did not match are absent.
    pub params: Params,
    /// Pairs from the URL's query string.
    pub query: Params,
}

/// A compiled pattern, ready to test URLs.
///
/// ```rust
/// use named_routes::{Matcher, parse};
///
/// let matcher = Matcher::new(&parse("/users/{id}/posts/{postId}").unwrap()).unwrap();
/// let matched = matcher.matches("/users/123/posts/abc%20def?page=2").unwrap();
///
/// assert_eq!(matched.params.get("postId"), Some("abc def"));
/// assert_eq!(matched.query.get("page"), Some("2"));
/// assert!(matcher.matches("/users/123").is_none());
/// ```
#[derive(Clone, Debug)]
pub struct Matcher {
    regex: Regex,
    /// `(group name, placeholder name)` in pattern order.
    groups: Vec<(String, String)>,
}

impl Matcher {
    /// Compile `pattern` into a matcher.
    ///
    /// [`parse`](crate::parse) already runs this check, so it only fails for
    /// patterns that were assembled some other way.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidConstraint`] naming the placeholder whose
    /// constraint does not compile inside its capture group, or
    /// [`ParseError::InvalidMatcher`] if the assembled expression is
    /// rejected as a whole.
    pub fn new(pattern: &Pattern) -> Result<Self, ParseError> {
        let mut fragment = String::new();
        let mut groups = Vec::new();
        render(pattern.children(), &mut fragment, &mut groups)?;

        let regex = Regex::new(&format!("^(?:{fragment})/?$")).map_err(|err| {
            ParseError::InvalidMatcher {
                reason: err.to_string(),
            }
        })?;

        Ok(Self { regex, groups })
    }

    /// The compiled regular expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match `url` against the pattern.
    ///
    /// Any `scheme://host` prefix is ignored and the query string is parsed
    /// separately. If the raw path does not match, its percent-decoded form
    /// is tried. Returns `None` when neither matches.
    #[must_use]
    pub fn matches(&self, url: &str) -> Option<RouteMatch> {
        let (location, query) = split_url(url);

        let params = self.extract(location).or_else(|| {
            let decoded = percent_decode_str(location).decode_utf8_lossy();
            self.extract(&decoded)
        });

        let Some(params) = params else {
            tracing::trace!(url, regex = self.as_str(), "url did not match");
            return None;
        };

        tracing::trace!(url, regex = self.as_str(), "url matched");
        Some(RouteMatch {
            params,
            query: query.map(Params::from_query).unwrap_or_default(),
        })
    }

    fn extract(&self, location: &str) -> Option<Params> {
        let captures = match self.regex.captures(location) {
            Ok(captures) => captures?,
            Err(error) => {
                // Backtracking limit hit: treated as no match.
                tracing::debug!(location, regex = self.as_str(), %error, "match aborted");
                return None;
            }
        };

        Some(
            self.groups
                .iter()
                .filter_map(|(group, name)| {
                    captures.name(group).map(|value| {
                        (
                            name.as_str(),
                            percent_decode_str(value.as_str()).decode_utf8_lossy(),
                        )
                    })
                })
                .collect(),
        )
    }
}

fn render(
    nodes: &[Node],
    out: &mut String,
    groups: &mut Vec<(String, String)>,
) -> Result<(), ParseError> {
    for node in nodes {
        match node {
            Node::Static(value) => out.push_str(&fancy_regex::escape(value)),
            Node::Placeholder(placeholder) => {
                let group = format!("{GROUP_PREFIX}{}", groups.len());
                let capture = format!("(?P<{group}>{})", placeholder.regex());
                if placeholder.constraint().is_some() {
                    check_constraint(placeholder, &capture)?;
                }
                out.push_str(&capture);
                groups.push((group, placeholder.name().to_owned()));
            }
            Node::Optional(children) => {
                out.push_str("(?:");
                render(children, out, groups)?;
                out.push_str(")?");
            }
        }
    }

    Ok(())
}

/// A constraint must compile on its own and inside its capture group. The
/// second check catches constraints such as `(?x)a#`, whose comment would
/// swallow the closing parenthesis.
fn check_constraint(placeholder: &Placeholder, capture: &str) -> Result<(), ParseError> {
    Regex::new(placeholder.regex())
        .and_then(|_| Regex::new(&format!("^{capture}$")))
        .map(drop)
        .map_err(|err| ParseError::InvalidConstraint {
            name: placeholder.name().to_owned(),
            reason: err.to_string(),
        })
}

/// Splits `url` into its path (origin stripped) and optional query.
fn split_url(url: &str) -> (&str, Option<&str>) {
    let (location, query) = match url.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (url, None),
    };

    (strip_origin(location), query)
}

/// Drops a leading `scheme://authority`, keeping the path. A bare origin is
/// `/`. The origin is validated with [`http::Uri`]; the path is sliced from
/// `location` because `Uri` rejects characters (spaces, non-ASCII) that the
/// decoded retry has to see.
fn strip_origin(location: &str) -> &str {
    let Some(scheme_end) = location.find("://") else {
        return location;
    };

    let authority_start = scheme_end + "://".len();
    let origin_end = location[authority_start..]
        .find('/')
        .map_or(location.len(), |slash| authority_start + slash);

    match location[..origin_end].parse::<Uri>() {
        Ok(origin) if origin.scheme().is_some() && origin.authority().is_some() => {
            match &location[origin_end..] {
                "" => "/",
                path => path,
            }
        }
        _ => location,
    }
}
