//! # waymark
//!
//! Path pattern compilation, middleware-style route resolution, and URL
//! generation.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on `waymark`
//! to get everything, or on `waymark-pattern` alone if only the path matcher
//! is needed.
//!
//! ```
//! use waymark::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router: Router<(), String> = Router::new(
//!     vec![Route::new("/posts/:id").name("post").action(action(
//!         |ctx: Context<(), String>| async move {
//!             let id = ctx.params["id"].as_str().unwrap_or_default().to_string();
//!             Ok(Outcome::Value(id))
//!         },
//!     ))],
//!     RouterOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(router.resolve("/posts/42").await.unwrap(), "42");
//!
//! let urls = UrlGenerator::new(&router, UrlOptions::default());
//! let url = urls.url("post", &params([("id", ParamValue::from("42"))])).unwrap();
//! assert_eq!(url, "/posts/42");
//! # });
//! ```

/// Error types, settings, and logging.
pub use waymark_core as core;

/// Path pattern lexing, parsing, matching, and compilation.
#[cfg(feature = "pattern")]
pub use waymark_pattern as pattern;

/// Route trees, resolution, and URL generation.
#[cfg(feature = "router")]
pub use waymark_router as router;

pub use serde_json;
pub use tracing;

/// The types most applications need.
pub mod prelude {
    pub use waymark_core::{RouterError, RouterResult, Settings};

    #[cfg(feature = "pattern")]
    pub use waymark_pattern::{
        compile, match_path, params, path_to_regexp, ParamValue, Params, PatternOptions,
    };

    #[cfg(feature = "router")]
    pub use waymark_router::{
        action, Context, Outcome, Route, Router, RouterOptions, SyncContext, SyncRouter,
        UrlGenerator, UrlOptions,
    };
}
