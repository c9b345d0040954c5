#[cfg(test)]
#[allow(clippy::expect_used)] // Tests panic on failure by design.
mod tests {
    use named_routes::{
        Matcher, OptionalPlacement, Params, ParseError, Route, RouteDefinition, Router,
        RouterConfig, RouterError, build, parse,
    };
    use serde::Serialize;

    // ==============================================================================
    // Test Helpers
    // ==============================================================================

    /// Route `tracing` output through the test harness so `--nocapture`
    /// shows parse and match events.
    fn init_tracing() {
        // Another test may already have installed it.
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init()
            .unwrap_or_default();
    }

    fn route(uri: &str) -> Route {
        Route::new("test.route", RouteDefinition::new(uri)).expect("valid route")
    }

    /// Builds `pattern` with `params` and matches the result back.
    fn round_trip(pattern: &str, params: &Params) -> Params {
        let parsed = parse(pattern).expect("valid pattern");
        let url = build(&parsed, params);
        Matcher::new(&parsed)
            .expect("parsed patterns compile")
            .matches(&url)
            .expect("built URL matches its own pattern")
            .params
    }

    const ROUTES_JSON: &str = r#"{
        "url": "https://example.com/",
        "routes": {
            "home": { "uri": "/", "methods": ["GET", "HEAD"] },
            "users.index": { "uri": "users", "methods": ["GET", "HEAD"] },
            "users.store": { "uri": "users", "methods": ["POST"] },
            "users.show": { "uri": "users/{id:\\d+}[/{tab}]", "methods": ["GET", "HEAD"] },
            "posts.show": { "uri": "users/{user}/posts/{post-slug}", "methods": ["GET"] }
        }
    }"#;

    fn router() -> Router {
        let config: RouterConfig = serde_json::from_str(ROUTES_JSON).expect("valid config");
        Router::new(config).expect("valid routes")
    }

    // ==============================================================================
    // Route: compile
    // ==============================================================================

    #[test]
    fn compiles_a_route_with_parameters() {
        init_tracing();
        let route = route("/users/{id}/profile");

        assert_eq!(route.compile(&Params::new().with("id", 123)), "/users/123/profile");
    }

    #[test]
    fn optional_parameters_in_square_brackets() {
        let route = route("users/{id}[/{action}]");

        assert_eq!(
            route.compile(&Params::new().with("id", 123).with("action", "edit")),
            "/users/123/edit"
        );
        assert_eq!(route.compile(&Params::new().with("id", 123)), "/users/123");

        let with_action = route.matches_url("/users/123/edit").expect("matches");
        assert_eq!(
            with_action.params,
            Params::from([("id", "123"), ("action", "edit")])
        );
        assert!(with_action.query.is_empty());

        let without_action = route.matches_url("/users/123").expect("matches");
        assert_eq!(without_action.params, Params::from([("id", "123")]));
    }

    #[test]
    fn compile_from_serializable_struct() {
        #[derive(Serialize)]
        struct Show {
            id: u64,
            tab: Option<&'static str>,
            highlight: bool,
        }

        let route = route("users/{id}[/{tab}]");
        let params = Params::from_serialize(&Show {
            id: 9,
            tab: None,
            highlight: true,
        })
        .expect("flat struct");

        assert_eq!(route.compile(&params), "/users/9?highlight=true");
    }

    // ==============================================================================
    // Route: matches_url
    // ==============================================================================

    #[test]
    fn matches_a_url_with_query_parameters() {
        init_tracing();
        let matched = route("users/{id}")
            .matches_url("/users/123?page=2&sort=name")
            .expect("matches");

        assert_eq!(matched.params, Params::from([("id", "123")]));
        assert_eq!(matched.query, Params::from([("page", "2"), ("sort", "name")]));
    }

    #[test]
    fn decodes_url_parameters() {
        let matched = route("users/{id}/posts/{postId}")
            .matches_url("/users/123/posts/abc%20def")
            .expect("matches");

        assert_eq!(
            matched.params,
            Params::from([("id", "123"), ("postId", "abc def")])
        );
        assert!(matched.query.is_empty());
    }

    #[test]
    fn non_get_routes_never_match() {
        let route = Route::new(
            "test.route",
            RouteDefinition::new("test/{id}").methods(["POST"]),
        )
        .expect("valid route");

        assert!(route.matches_url("/test/123").is_none());
    }

    #[test]
    fn absolute_urls_match_on_their_path() {
        let matched = route("users/{id}")
            .matches_url("https://example.com/users/5?tab=posts")
            .expect("matches");

        assert_eq!(matched.params.get("id"), Some("5"));
        assert_eq!(matched.query.get("tab"), Some("posts"));
    }

    // ==============================================================================
    // Properties
    // ==============================================================================

    #[test]
    fn build_then_match_round_trips() {
        let pattern = "/orgs/{org}/repos/{repo:[a-z0-9-]+}/issues/{number:\\d+}";
        let params = Params::new()
            .with("org", "rust lang")
            .with("repo", "named-routes")
            .with("number", 1234);

        assert_eq!(round_trip(pattern, &params), params);
    }

    #[test]
    fn round_trip_survives_reserved_characters() {
        let params = Params::new()
            .with("org", "a?b")
            .with("repo", "50%25 off/now")
            .with("number", "x y");

        assert_eq!(round_trip("/orgs/{org}/repos/{repo}/issues/{number}", &params), params);
    }

    #[test]
    fn lookaround_constraints_route_urls() {
        let route = route("users/{id:(?!new$)[a-z0-9]+}");

        assert!(route.matches_url("/users/ada").is_some());
        assert!(route.matches_url("/users/new").is_none());
        assert_eq!(route.compile(&Params::new().with("id", "ada")), "/users/ada");
    }

    #[test]
    fn constraint_that_breaks_the_matcher_fails_to_parse() {
        assert!(matches!(
            parse("/{id:(?x)a#}"),
            Err(ParseError::InvalidConstraint { .. })
        ));
        assert!(
            Route::new("r", RouteDefinition::new("{id:(?x)\\d+ #}")).is_err()
        );
    }

    #[test]
    fn fully_collapsed_pattern_builds_root() {
        let pattern = parse("/[{id}]").expect("valid pattern");
        assert_eq!(build(&pattern, &Params::new()), "/");
    }

    #[test]
    fn round_trip_ignores_extra_params() {
        let params = Params::new().with("id", 7).with("page", 3);
        assert_eq!(round_trip("/users/{id}", &params), Params::from([("id", "7")]));
    }

    #[test]
    fn optional_segments_are_all_or_nothing() {
        let pattern = parse("/calendar[/{year}/{month}]").expect("valid pattern");

        assert_eq!(
            build(&pattern, &Params::new().with("year", 2024).with("month", 5)),
            "/calendar/2024/5"
        );
        assert_eq!(
            build(&pattern, &Params::new().with("year", 2024)),
            "/calendar?year=2024"
        );
    }

    #[test]
    fn nested_optionals_are_independent() {
        let pattern = parse("/users[/{id}[/{name}]]").expect("valid pattern");

        assert_eq!(build(&pattern, &Params::new()), "/users");
        assert_eq!(build(&pattern, &Params::new().with("id", 123)), "/users/123");
        assert_eq!(
            build(&pattern, &Params::new().with("id", 123).with("name", "ada")),
            "/users/123/ada"
        );
    }

    #[test]
    fn built_urls_never_contain_double_slashes() {
        let pattern = parse("/a/[{b}/]/[{c}]/d/").expect("valid pattern");

        for params in [
            Params::new(),
            Params::new().with("b", "x"),
            Params::new().with("c", "y"),
            Params::new().with("b", "x").with("c", "y"),
        ] {
            let url = build(&pattern, &params);
            assert!(!url.contains("//"), "{url}");
            assert!(url.ends_with('/'), "{url}");
        }
    }

    #[test]
    fn duplicate_placeholders_are_rejected() {
        assert!(matches!(
            parse("/a/{id}/b/{id}"),
            Err(ParseError::DuplicatePlaceholder { .. })
        ));
        assert!(parse("/a/{id}/b/{name}").is_ok());
    }

    #[test]
    fn capturing_groups_are_rejected() {
        assert!(matches!(
            parse("/{id:(foo)}"),
            Err(ParseError::CapturingGroupInConstraint { .. })
        ));
        assert!(parse("/{id:(?:foo)}").is_ok());
        assert!(parse("/{id:[a(b]}").is_ok());
    }

    #[test]
    fn parsing_is_idempotent() {
        let pattern = "/users/{id:[0-9]{1,3}}[/posts[/{post}]]";
        assert_eq!(parse(pattern), parse(pattern));
        assert_eq!(
            parse(pattern).expect("valid pattern").to_string(),
            pattern
        );
    }

    #[test]
    fn trailing_only_placement_is_opt_in() {
        let definition = RouteDefinition::new("users[/{id}]/edit");

        assert!(Route::new("edit", definition.clone()).is_ok());
        assert!(Route::with_placement("edit", definition, OptionalPlacement::TrailingOnly).is_err());
    }

    // ==============================================================================
    // Router
    // ==============================================================================

    #[test]
    fn router_from_json_config() {
        init_tracing();
        let router = router();

        assert!(router.has("users.show"));
        assert!(!router.has("users.destroy"));
        assert_eq!(router.base_url(), "https://example.com");
    }

    #[test]
    fn router_generates_absolute_urls() {
        let router = router();

        assert_eq!(
            router.url("home", &Params::new()).expect("known route"),
            "https://example.com/"
        );
        assert_eq!(
            router
                .url("posts.show", &Params::new().with("user", "ada").with("post-slug", "hello"))
                .expect("known route"),
            "https://example.com/users/ada/posts/hello"
        );
        assert!(matches!(
            router.url("missing", &Params::new()),
            Err(RouterError::UnknownRoute { .. })
        ));
    }

    #[test]
    fn router_resolves_urls_to_names() {
        let router = router();

        let resolved = router
            .resolve("https://example.com/users/12/settings?x=1")
            .expect("resolves");
        assert_eq!(resolved.name, "users.show");
        assert_eq!(resolved.params, Params::from([("id", "12"), ("tab", "settings")]));
        assert_eq!(resolved.query, Params::from([("x", "1")]));

        assert_eq!(router.resolve("/users").expect("resolves").name, "users.index");
        assert_eq!(router.resolve("/").expect("resolves").name, "home");
        assert!(router.resolve("/users/abc").is_none());
        assert!(router.resolves_to("/users/ada/posts/hi", "posts.*"));
    }

    #[test]
    fn router_rejects_bad_route_tables() {
        let config: RouterConfig = serde_json::from_str(
            r#"{ "routes": { "bad": { "uri": "users[/{id}", "methods": ["GET"] } } }"#,
        )
        .expect("valid json");

        let err = Router::new(config).expect_err("unbalanced brackets");
        assert!(err.to_string().starts_with("route `bad` is invalid"));
    }

    #[test]
    fn router_config_reads_placement_policy() {
        let config: RouterConfig = serde_json::from_str(
            r#"{ "optionalPlacement": "trailingOnly", "routes": { "a": { "uri": "a[/{b}]/c" } } }"#,
        )
        .expect("valid json");

        assert_eq!(config.optional_placement, OptionalPlacement::TrailingOnly);
        assert!(Router::new(config).is_err());
    }
}
