use std::sync::{Arc, Mutex};

use waymark_core::{RouterError, RouterResult};
use waymark_pattern::{params, ParamValue, Params};
use waymark_router::{
    action, Context, Outcome, Route, Router, RouterOptions, SyncAction, SyncRouter, UrlGenerator,
    UrlOptions,
};

type Ctx = Context<(), String>;

fn sync_router(routes: Vec<Route<SyncAction<(), ()>>>, base_url: &str) -> SyncRouter<(), ()> {
    SyncRouter::new(routes, RouterOptions::default().base_url(base_url)).unwrap()
}

fn query_string(params: &Params) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| value.as_str().filter(|v| !v.is_empty()).map(|v| (key, v)))
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    pairs.sort();
    pairs.join("&")
}

#[test]
fn test_base_url_and_query_params() {
    let router = sync_router(vec![Route::new("/post/:id").name("post")], "/base");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = Arc::clone(&seen);
    let urls = UrlGenerator::new(
        &router,
        UrlOptions::default().stringify_query_params(move |params: &Params| {
            let mut keys: Vec<String> = params.keys().cloned().collect();
            keys.sort();
            hook_seen.lock().unwrap().push(keys);
            query_string(params)
        }),
    );

    let url = urls
        .url(
            "post",
            &params([
                ("id", ParamValue::from("12")),
                ("extra", ParamValue::from("y")),
                ("empty", ParamValue::from("")),
            ]),
        )
        .unwrap();
    assert_eq!(url, "/base/post/12?extra=y");

    let url = urls.url("post", &params([("id", ParamValue::from("12"))])).unwrap();
    assert_eq!(url, "/base/post/12");

    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec!["empty".to_string(), "extra".to_string()], Vec::new()]
    );
}

#[test]
fn test_query_hook_may_supply_question_mark() {
    let router = sync_router(vec![Route::new("/search").name("search")], "");
    let urls = UrlGenerator::new(
        &router,
        UrlOptions::default().stringify_query_params(|p: &Params| format!("?{}", query_string(p))),
    );
    let url = urls
        .url("search", &params([("q", ParamValue::from("rust"))]))
        .unwrap();
    assert_eq!(url, "/search?q=rust");
}

#[test]
fn test_missing_parameter() {
    let router = sync_router(vec![Route::new("/post/:id").name("post")], "");
    let urls = UrlGenerator::new(&router, UrlOptions::default());
    assert_eq!(
        urls.url("post", &Params::new()).unwrap_err(),
        RouterError::MissingParameter("id".into())
    );
}

#[test]
fn test_duplicate_names_are_reported() {
    let router = sync_router(
        vec![
            Route::new("/a").name("dup"),
            Route::new("/b").child(Route::new("/c").name("dup")),
            Route::new("/d").name("other"),
        ],
        "",
    );
    let urls = UrlGenerator::new(&router, UrlOptions::default());
    assert_eq!(
        urls.url("dup", &Params::new()).unwrap_err(),
        RouterError::DuplicateRouteName("dup".into())
    );
    assert_eq!(
        urls.url("other", &Params::new()).unwrap_err(),
        RouterError::DuplicateRouteName("dup".into())
    );
}

#[test]
fn test_repeated_parameter() {
    let router = sync_router(vec![Route::new("/files/:path+").name("files")], "");
    let urls = UrlGenerator::new(&router, UrlOptions::default());
    assert_eq!(
        urls.url("files", &params([("path", ParamValue::from(vec!["a", "b c"]))]))
            .unwrap(),
        "/files/a/b%20c"
    );
}

#[test]
fn test_name_added_after_creation_is_found() {
    let mut router = sync_router(vec![Route::new("/a").name("a")], "/base");
    let urls = UrlGenerator::new(&router, UrlOptions::default());
    assert_eq!(urls.url("a", &Params::new()).unwrap(), "/base/a");

    let root = router.tree().root();
    router.add_route(root, Route::new("/b").name("b")).unwrap();

    assert_eq!(urls.url("b", &Params::new()).unwrap(), "/base/b");
    assert_eq!(urls.url("a", &Params::new()).unwrap(), "/base/a");
}

#[test]
fn test_added_duplicate_name_is_reported_on_next_miss() {
    let mut router = sync_router(vec![Route::new("/a").name("a")], "");
    let urls = UrlGenerator::new(&router, UrlOptions::default());
    assert_eq!(urls.url("a", &Params::new()).unwrap(), "/a");

    let root = router.tree().root();
    router.add_route(root, Route::new("/a2").name("a")).unwrap();

    assert_eq!(urls.url("a", &Params::new()).unwrap(), "/a");
    assert_eq!(
        urls.url("missing", &Params::new()).unwrap_err(),
        RouterError::DuplicateRouteName("a".into())
    );
}

#[test]
fn test_cloned_router_does_not_leak_routes() {
    let router = sync_router(vec![Route::new("/a").name("a")], "");
    let urls = UrlGenerator::new(&router, UrlOptions::default());

    let mut copy = router.clone();
    let root = copy.tree().root();
    copy.add_route(root, Route::new("/b").name("b")).unwrap();

    assert!(matches!(
        urls.url("b", &Params::new()),
        Err(RouterError::RouteNameNotFound(_))
    ));
    let copy_urls = UrlGenerator::new(&copy, UrlOptions::default());
    assert_eq!(copy_urls.url("b", &Params::new()).unwrap(), "/b");
}

fn echo_id(ctx: Ctx) -> impl std::future::Future<Output = RouterResult<Outcome<String>>> {
    async move {
        let id = ctx.params.get("id").and_then(ParamValue::as_str).unwrap_or_default();
        Ok(Outcome::Value(id.to_string()))
    }
}

#[tokio::test]
async fn test_async_router_shares_added_routes() {
    let mut router: Router<(), String> = Router::new(
        vec![Route::new("/blog").name("blog")],
        RouterOptions::default(),
    )
    .unwrap();
    let urls = UrlGenerator::new(&router, UrlOptions::default());

    let root = router.tree().root();
    router
        .add_route(root, Route::new("/post/:id").name("post").action(action(echo_id)))
        .unwrap();

    let url = urls.url("post", &params([("id", ParamValue::from("7"))])).unwrap();
    assert_eq!(url, "/post/7");
    assert_eq!(router.resolve(&url).await.unwrap(), "7");
}

#[tokio::test]
async fn test_generated_url_resolves_back() {
    let router: Router<(), String> = Router::new(
        vec![Route::new("/blog")
            .name("blog")
            .child(Route::new("/:id").name("entry").action(action(echo_id)))],
        RouterOptions::default().base_url("/site"),
    )
    .unwrap();
    let urls = UrlGenerator::new(&router, UrlOptions::default());

    let url = urls
        .url("entry", &params([("id", ParamValue::from("hello world"))]))
        .unwrap();
    assert_eq!(url, "/site/blog/hello%20world");
    assert_eq!(router.resolve(&url).await.unwrap(), "hello world");
}
