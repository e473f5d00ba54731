use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use waymark_core::{RouterError, RouterResult};
use waymark_router::{
    sync, Action, Context, Outcome, Route, Router, RouterOptions, SyncAction, SyncContext,
    SyncRouter,
};

type SyncCtx = SyncContext<(), String>;

/// The same tree shape for both router flavors; `make` builds each action.
fn shape<A>(make: impl Fn(&'static str, Outcome<String>) -> A) -> Vec<Route<A>> {
    vec![
        Route::new("/a").action(make("a", Outcome::Absent)).children([
            Route::new("/b")
                .action(make("a.b", Outcome::Miss))
                .child(Route::new("/c").action(make("a.b.c", Outcome::Value("abc".into())))),
            Route::new("/:x").action(make("a.x", Outcome::Value("ax".into()))),
        ]),
        Route::new("/:any*").action(make("fallback", Outcome::Value("fallback".into()))),
    ]
}

fn sync_router(log: &Rc<RefCell<Vec<String>>>) -> SyncRouter<(), String> {
    let routes = shape(|label, outcome| -> SyncAction<(), String> {
        let log = Rc::clone(log);
        sync::action(move |_: SyncCtx| {
            log.borrow_mut().push(label.to_string());
            Ok(outcome.clone())
        })
    });
    SyncRouter::new(routes, RouterOptions::default()).unwrap()
}

fn async_router(log: &Arc<Mutex<Vec<String>>>) -> Router<(), String> {
    let routes = shape(|label, outcome| -> Action<(), String> {
        let log = Arc::clone(log);
        waymark_router::action(move |_: Context<(), String>| {
            log.lock().unwrap().push(label.to_string());
            let outcome = outcome.clone();
            async move { Ok(outcome) }
        })
    });
    Router::new(routes, RouterOptions::default()).unwrap()
}

#[tokio::test]
async fn test_sync_and_async_agree() {
    let cases = [
        ("/a/b/c", "fallback", vec!["a", "a.b", "fallback"]),
        ("/a/z", "ax", vec!["a", "a.x"]),
        ("/zzz", "fallback", vec!["fallback"]),
        ("/a", "fallback", vec!["a", "fallback"]),
    ];
    for (pathname, expected, trail) in cases {
        let sync_log = Rc::new(RefCell::new(Vec::new()));
        let async_log = Arc::new(Mutex::new(Vec::new()));
        let sync_result = sync_router(&sync_log).resolve(pathname);
        let async_result = async_router(&async_log).resolve(pathname).await;

        assert_eq!(sync_result, async_result, "{pathname}");
        assert_eq!(sync_result.unwrap(), expected, "{pathname}");
        assert_eq!(*sync_log.borrow(), trail, "{pathname}");
        assert_eq!(*async_log.lock().unwrap(), trail, "{pathname}");
    }
}

#[test]
fn test_sync_middleware_and_next_child() {
    let router: SyncRouter<(), String> = SyncRouter::new(
        vec![
            Route::new("/admin")
                .action(sync::action(|ctx: SyncCtx| {
                    Ok(ctx.next_child()?.map(|v| format!("admin:{v}")))
                }))
                .child(Route::new("/users").action(sync::action(|_: SyncCtx| {
                    Ok(Outcome::Value("users".to_string()))
                }))),
            Route::new("/admin/:page").action(sync::action(|ctx: SyncCtx| {
                Ok(Outcome::Value(format!(
                    "page:{}",
                    ctx.params["page"].as_str().unwrap_or_default()
                )))
            })),
        ],
        RouterOptions::default(),
    )
    .unwrap();
    assert_eq!(router.resolve("/admin/users").unwrap(), "admin:users");
    assert_eq!(router.resolve("/admin/settings").unwrap(), "page:settings");
}

#[test]
fn test_sync_error_handler() {
    let router: SyncRouter<(), String> = SyncRouter::new(
        vec![Route::new("/boom").action(sync::action(|_: SyncCtx| -> RouterResult<Outcome<String>> {
            Err(RouterError::handler(500, "boom"))
        }))],
        RouterOptions::default().base_url("/app"),
    )
    .unwrap()
    .with_error_handler(|err: RouterError, ctx: SyncCtx| {
        Ok(format!("{} {} ({})", err.status_code(), err, ctx.pathname))
    });
    assert_eq!(router.resolve("/app/boom").unwrap(), "500 boom (/app/boom)");
    assert_eq!(
        router.resolve("/elsewhere").unwrap(),
        "404 Route not found: /elsewhere (/elsewhere)"
    );
}

#[test]
fn test_sync_base_url_accounting() {
    let router: SyncRouter<(), String> = SyncRouter::new(
        Route::new("/a").child(Route::new("/b").child(Route::new("/c").action(sync::action(
            |ctx: SyncCtx| Ok(Outcome::Value(format!("{}|{}", ctx.base_url, ctx.path))),
        )))),
        RouterOptions::default().base_url("/base"),
    )
    .unwrap();
    assert_eq!(router.resolve("/base/a/b/c").unwrap(), "/base/a/b|/c");
    assert_eq!(
        router.resolve("/a/b/c").unwrap_err(),
        RouterError::not_found("/a/b/c")
    );
}
