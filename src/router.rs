// ==============================================================================
// Router — a named route table
// ==============================================================================
//
// Holds every route of an application, keyed by name, in declaration order.
// All patterns are parsed up front so that a bad route table fails at
// construction rather than on first use.

use std::borrow::Cow;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    build::Params,
    error::RouterError,
    parser::OptionalPlacement,
    route::{Route, RouteDefinition},
};

// ==============================================================================
// RouterConfig
// ==============================================================================

/// The route table a [`Router`] is built from.
///
/// Deserializes from the usual named-routes document:
///
/// ```rust
/// use named_routes::RouterConfig;
///
/// let config: RouterConfig = serde_json::from_str(r#"{
///     "url": "https://example.com",
///     "routes": {
///         "users.index": { "uri": "users", "methods": ["GET", "HEAD"] },
///         "users.show": { "uri": "users/{id}", "methods": ["GET", "HEAD"] }
///     }
/// }"#).unwrap();
///
/// assert_eq!(config.routes.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Base URL prepended to generated URLs.
    #[serde(default)]
    pub url: String,
    /// Routes by name, in resolution order.
    #[serde(default)]
    pub routes: IndexMap<String, RouteDefinition>,
    /// Placement policy for optional segments in every pattern.
    #[serde(default)]
    pub optional_placement: OptionalPlacement,
}

impl RouterConfig {
    /// An empty table with the given base URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Add (or replace) a route.
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, definition: RouteDefinition) -> Self {
        self.routes.insert(name.into(), definition);
        self
    }

    /// Select the optional-segment placement policy.
    #[must_use]
    pub const fn optional_placement(mut self, placement: OptionalPlacement) -> Self {
        self.optional_placement = placement;
        self
    }
}

// ==============================================================================
// Router
// ==============================================================================

/// A URL matched back to a named route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// Name of the first route that matched.
    pub name: &'a str,
    /// Path parameters.
    pub params: Params,
    /// Query parameters.
    pub query: Params,
}

/// Named routes with a base URL.
///
/// ```rust
/// use named_routes::{Params, RouteDefinition, Router, RouterConfig};
///
/// let router = Router::new(
///     RouterConfig::new("https://example.com")
///         .route("users.show", RouteDefinition::new("users/{id}")),
/// )
/// .unwrap();
///
/// assert_eq!(
///     router.url("users.show", &Params::new().with("id", 7)).unwrap(),
///     "https://example.com/users/7"
/// );
/// assert_eq!(router.resolve("/users/7").unwrap().name, "users.show");
/// ```
#[derive(Clone, Debug)]
pub struct Router {
    base: String,
    routes: IndexMap<String, Route>,
}

impl Router {
    /// Build every route in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoute`] for the first route whose
    /// pattern or methods are invalid.
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        let RouterConfig {
            url,
            routes,
            optional_placement,
        } = config;

        let routes = routes
            .into_iter()
            .map(|(name, definition)| {
                Route::with_placement(name.clone(), definition, optional_placement)
                    .map(|route| (name.clone(), route))
                    .map_err(|source| RouterError::InvalidRoute { name, source })
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        tracing::debug!(base = %url, routes = routes.len(), "built router");

        Ok(Self {
            base: url.trim_end_matches('/').to_owned(),
            routes,
        })
    }

    /// The base URL, without a trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Whether a route called `name` exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// The route called `name`.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// All routes in resolution order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// The absolute URL of route `name` built from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownRoute`] if no such route exists.
    pub fn url(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        let route = self.route(name).ok_or_else(|| RouterError::UnknownRoute {
            name: name.to_owned(),
        })?;

        let path = route.compile(params);
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(format!("{}{separator}{path}", self.base))
    }

    /// The first route, in table order, that matches `url`.
    ///
    /// A leading base URL is stripped before matching, so both
    /// `https://example.com/app/users/1` and `/users/1` resolve under a base
    /// of `https://example.com/app`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<Resolved<'_>> {
        let relative = match url.strip_prefix(self.base.as_str()) {
            Some(rest) if self.base.is_empty() || rest.starts_with('/') => Cow::Borrowed(rest),
            Some(rest) if rest.is_empty() || rest.starts_with('?') => Cow::Owned(format!("/{rest}")),
            _ => Cow::Borrowed(url),
        };

        let resolved = self.routes.iter().find_map(|(name, route)| {
            route.matches_url(&relative).map(|matched| Resolved {
                name: name.as_str(),
                params: matched.params,
                query: matched.query,
            })
        });

        if resolved.is_none() {
            tracing::trace!(url, "no route matched");
        }

        resolved
    }

    /// Whether `url` resolves to a route whose name matches `glob`
    /// (see [`name_matches`]).
    #[must_use]
    pub fn resolves_to(&self, url: &str, glob: &str) -> bool {
        self.resolve(url)
            .is_some_and(|resolved| name_matches(glob, resolved.name))
    }
}

/// Whether route `name` matches `glob`, where `*` stands for any run of
/// characters and everything else is literal.
///
/// ```rust
/// use named_routes::name_matches;
///
/// assert!(name_matches("users.*", "users.show"));
/// assert!(!name_matches("users.*", "posts.show"));
/// assert!(name_matches("users.show", "users.show"));
/// ```
#[must_use]
pub fn name_matches(glob: &str, name: &str) -> bool {
    let pattern = format!("^{}$", regex::escape(glob).replace(r"\*", ".*"));
    Regex::new(&pattern).is_ok_and(|regex| regex.is_match(name))
}
