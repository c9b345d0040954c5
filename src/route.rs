// ==============================================================================
// Route — a named pattern with its allowed methods
// ==============================================================================

use http::Method;
use serde::{Deserialize, Serialize};

use crate::{
    ast::Pattern,
    build::{Params, build},
    error::RouteError,
    matcher::{Matcher, RouteMatch},
    parser::{OptionalPlacement, Parser},
};

/// How a route is declared in a route table.
///
/// ```rust
/// use named_routes::RouteDefinition;
///
/// let definition: RouteDefinition =
///     serde_json::from_str(r#"{ "uri": "users/{id}", "methods": ["GET", "HEAD"] }"#).unwrap();
/// assert_eq!(definition.uri, "users/{id}");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// The route pattern. A leading `/` is implied.
    pub uri: String,
    /// Allowed HTTP methods.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}

fn default_methods() -> Vec<String> {
    vec![Method::GET.to_string(), Method::HEAD.to_string()]
}

impl RouteDefinition {
    /// A definition for `uri` accepting `GET` and `HEAD`.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            methods: default_methods(),
        }
    }

    /// Replace the allowed methods.
    #[must_use]
    pub fn methods<I, M>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }
}

/// A named route: the parsed pattern, its compiled matcher and its methods.
///
/// ```rust
/// use named_routes::{Params, Route, RouteDefinition};
///
/// let route = Route::new("user.profile", RouteDefinition::new("users/{id}[/{action}]")).unwrap();
///
/// assert_eq!(route.compile(&Params::new().with("id", 123)), "/users/123");
/// let matched = route.matches_url("/users/123/edit").unwrap();
/// assert_eq!(matched.params.get("action"), Some("edit"));
/// ```
#[derive(Clone, Debug)]
pub struct Route {
    name: String,
    template: String,
    pattern: Pattern,
    matcher: Matcher,
    methods: Vec<Method>,
}

impl Route {
    /// Build a route with the default optional-segment placement.
    ///
    /// # Errors
    ///
    /// Fails if the pattern does not parse or a method is not a valid token.
    pub fn new(name: impl Into<String>, definition: RouteDefinition) -> Result<Self, RouteError> {
        Self::with_placement(name, definition, OptionalPlacement::default())
    }

    /// Build a route, parsing its pattern under `placement`.
    ///
    /// # Errors
    ///
    /// Fails if the pattern does not parse or a method is not a valid token.
    pub fn with_placement(
        name: impl Into<String>,
        definition: RouteDefinition,
        placement: OptionalPlacement,
    ) -> Result<Self, RouteError> {
        let template = normalize_template(&definition.uri);

        let pattern = Parser::new()
            .optional_placement(placement)
            .parse(&template)
            .map_err(|source| RouteError::Pattern {
                template: template.clone(),
                source,
            })?;

        let methods = definition
            .methods
            .iter()
            .map(|method| {
                Method::from_bytes(method.as_bytes()).map_err(|source| RouteError::InvalidMethod {
                    method: method.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let matcher = Matcher::new(&pattern).map_err(|source| RouteError::Pattern {
            template: template.clone(),
            source,
        })?;

        Ok(Self {
            name: name.into(),
            template,
            pattern,
            matcher,
            methods,
        })
    }

    /// The route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized pattern text: one leading `/`, no trailing `/`.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The parsed pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The allowed methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Placeholder names in pattern order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.pattern.placeholder_names()
    }

    /// Build this route's URL from `params`.
    #[must_use]
    pub fn compile(&self, params: &Params) -> String {
        build(&self.pattern, params)
    }

    /// Match `url` against this route.
    ///
    /// Routes that do not accept `GET` never match.
    #[must_use]
    pub fn matches_url(&self, url: &str) -> Option<RouteMatch> {
        if !self.methods.contains(&Method::GET) {
            tracing::trace!(route = %self.name, url, "route does not accept GET");
            return None;
        }

        self.matcher.matches(url)
    }
}

/// `users/{id}/` → `/users/{id}`; an empty or slash-only URI becomes `/`.
fn normalize_template(uri: &str) -> String {
    let trimmed = uri.trim_start_matches('/').trim_end_matches('/');
    format!("/{trimmed}")
}
