// ==============================================================================
// Error Types
// ==============================================================================
//
// Every structural problem with a pattern is reported by the parser. Building
// and matching never fail once a pattern has parsed; a URL that does not match
// is `None`, not an error.

use thiserror::Error;

/// Errors raised while parsing a route pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A `]` without an open `[`, or a `[` that is never closed.
    #[error("number of opening '[' and closing ']' does not match (at byte {position})")]
    MismatchedBrackets {
        /// Byte offset of the offending bracket.
        position: usize,
    },

    /// An optional segment closes somewhere other than the end of the
    /// pattern while the trailing-only placement policy is active.
    #[error("optional segments can only occur at the end of a route (at byte {position})")]
    OptionalMisplaced {
        /// Byte offset of the first character after the closing `]`.
        position: usize,
    },

    /// `[]` with nothing between the brackets.
    #[error("empty optional segment (at byte {position})")]
    EmptyOptionalSegment {
        /// Byte offset of the closing `]`.
        position: usize,
    },

    /// The same placeholder name appears twice.
    #[error("placeholder `{name}` is defined more than once")]
    DuplicatePlaceholder {
        /// The repeated name.
        name: String,
    },

    /// A constraint contains a plain capturing group.
    #[error("constraint `{constraint}` of placeholder `{name}` contains a capturing group")]
    CapturingGroupInConstraint {
        /// Placeholder the constraint belongs to.
        name: String,
        /// The offending constraint text.
        constraint: String,
    },

    /// A `{` is never closed.
    #[error("unterminated placeholder starting at byte {position}")]
    UnterminatedPlaceholder {
        /// Byte offset of the opening `{`.
        position: usize,
    },

    /// The placeholder name does not match `[a-zA-Z_][a-zA-Z0-9_-]*`.
    #[error("invalid placeholder name `{name}`")]
    InvalidPlaceholderName {
        /// The rejected name.
        name: String,
    },

    /// The constraint is not a usable regular expression.
    #[error("invalid constraint for placeholder `{name}`: {reason}")]
    InvalidConstraint {
        /// Placeholder the constraint belongs to.
        name: String,
        /// Why the constraint was rejected.
        reason: String,
    },

    /// Every constraint compiles, but the assembled matcher does not.
    #[error("route matcher does not compile: {reason}")]
    InvalidMatcher {
        /// The regex engine's message.
        reason: String,
    },
}

/// Errors raised while constructing a [`Route`](crate::Route).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RouteError {
    /// The route's URI pattern failed to parse.
    #[error("invalid route pattern `{template}`: {source}")]
    Pattern {
        /// The normalized template that was parsed.
        template: String,
        /// The underlying parse failure.
        #[source]
        source: ParseError,
    },

    /// One of the declared methods is not a valid HTTP method token.
    #[error("invalid HTTP method `{method}`")]
    InvalidMethod {
        /// The rejected method string.
        method: String,
        /// The underlying `http` error.
        #[source]
        source: http::method::InvalidMethod,
    },
}

/// Errors raised by a [`Router`](crate::Router).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RouterError {
    /// No route with this name is registered.
    #[error("route `{name}` is not in the route list")]
    UnknownRoute {
        /// The requested route name.
        name: String,
    },

    /// A route in the configuration could not be built.
    #[error("route `{name}` is invalid: {source}")]
    InvalidRoute {
        /// Name of the failing route.
        name: String,
        /// Why it failed.
        #[source]
        source: RouteError,
    },
}
