//! # `named-routes`
//!
//! Named URL route patterns. A pattern mixes literal text, `{name}` or
//! `{name:regex}` placeholders and `[...]` optional segments, which may nest:
//!
//! ```text
//! /users/{id:\d+}[/{action}[/{format}]]
//! ```
//!
//! The same parsed pattern builds URLs from parameters and matches URLs back
//! into parameters:
//!
//! ```rust
//! use named_routes::{Matcher, Params, build, parse};
//!
//! let pattern = parse("/users/{id}[/{action}]").unwrap();
//!
//! let url = build(&pattern, &Params::new().with("id", 42).with("page", 2));
//! assert_eq!(url, "/users/42?page=2");
//!
//! let matched = Matcher::new(&pattern).unwrap().matches("/users/42/edit").unwrap();
//! assert_eq!(matched.params.get("action"), Some("edit"));
//! ```
//!
//! [`Route`] binds a pattern to a name and its HTTP methods, and [`Router`]
//! holds a whole route table, usually deserialized from JSON.

mod ast;
mod build;
mod constraint;
mod error;
mod matcher;
mod parser;
mod route;
mod router;

pub use ast::{DEFAULT_CONSTRAINT, Node, Pattern, Placeholder};
pub use build::{Params, build};
pub use error::{ParseError, RouteError, RouterError};
pub use matcher::{Matcher, RouteMatch};
pub use parser::{OptionalPlacement, Parser, parse};
pub use route::{Route, RouteDefinition};
pub use router::{Resolved, Router, RouterConfig, name_matches};
