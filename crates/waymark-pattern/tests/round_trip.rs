use waymark_pattern::{compile, match_path, PatternOptions};

/// Matching a path and filling the pattern with the captured values must
/// produce a path the pattern accepts with the same parameters.
fn assert_round_trip(pattern: &str, pathname: &str) {
    let options = PatternOptions::default();
    let matcher = match_path(pattern, &options).unwrap();
    let builder = compile(pattern, &options).unwrap();

    let first = matcher
        .matches(pathname)
        .unwrap()
        .unwrap_or_else(|| panic!("{pattern} should match {pathname}"));
    let rebuilt = builder.to_path(&first.params).unwrap();
    let second = matcher
        .matches(&rebuilt)
        .unwrap()
        .unwrap_or_else(|| panic!("{pattern} should match rebuilt {rebuilt}"));

    assert_eq!(first.params, second.params, "{pattern} via {rebuilt}");
}

#[test]
fn test_named_parameters() {
    assert_round_trip("/user/:id", "/user/123");
    assert_round_trip("/:from-:to", "/1-2");
    assert_round_trip("/post/:slug.html", "/post/hello.html");
}

#[test]
fn test_optional_parameters() {
    assert_round_trip("/:a/:b?", "/x");
    assert_round_trip("/:a/:b?", "/x/y");
}

#[test]
fn test_repeated_parameters() {
    assert_round_trip("/files/:path*", "/files");
    assert_round_trip("/files/:path*", "/files/a/b/c");
    assert_round_trip("/tags/:tag+", "/tags/one/two");
}

#[test]
fn test_custom_patterns() {
    assert_round_trip("/:lang(en|fr)/about", "/fr/about");
    assert_round_trip("/order/(\\d+)", "/order/42");
    assert_round_trip("/trailing/:id", "/trailing/7/");
}

#[test]
fn test_rebuilt_path_omits_absent_optionals() {
    let options = PatternOptions::default();
    let matcher = match_path("/:a/:b?", &options).unwrap();
    let builder = compile("/:a/:b?", &options).unwrap();
    let matched = matcher.matches("/x/").unwrap().unwrap();
    assert_eq!(builder.to_path(&matched.params).unwrap(), "/x");
}
