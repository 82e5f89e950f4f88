//! An embeddable HTTP request router with middleware chains.
//!
//! ```rust
//! use trellis::{Context, HandlerResult, Router, StatusCode};
//! use trellis::http::Request;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.get("/blog/{category}/{post}", |cx: &mut Context| -> HandlerResult {
//!     let body = format!("{} in {}", cx.param("post").unwrap(), cx.param("category").unwrap());
//!     cx.text(StatusCode::OK, body);
//!     Ok(())
//! })?;
//!
//! let response = router.serve(Request::get("/blog/rust/routers").body(Vec::new())?);
//! assert_eq!(response.body(), b"routers in rust");
//! # Ok(())
//! # }
//! ```
//!
//! # Route Patterns
//!
//! Routes are registered per HTTP method. A pattern is a list of `/`-separated
//! segments, each of which is one of:
//!
//! ```text
//!  Syntax            Type
//!  users             literal
//!  {id}              named parameter
//!  {id:[0-9]+}       named parameter with a regex constraint
//!  {path:*}          catch-all parameter
//! ```
//!
//! Named parameters match exactly one non-empty segment:
//!
//! ```text
//!  Pattern: /blog/{category}/{post}
//!
//!  /blog/rust/request-routers            match: category="rust", post="request-routers"
//!  /blog/rust/request-routers/           match: category="rust", post="request-routers"
//!  /blog/rust/                           no match
//!  /blog/rust/request-routers/comments   no match
//! ```
//!
//! A constraint is a regular expression that must match the whole segment:
//!
//! ```text
//!  Pattern: /page/{page:[0-9]+}
//!
//!  /page/12                              match: page="12"
//!  /page/abc                             no match
//! ```
//!
//! Catch-all parameters match one or more segments. Unlike most routers, a
//! catch-all does not have to end the pattern, it may be followed by literal
//! segments:
//!
//! ```text
//!  Pattern: /src/{path:*}/raw
//!
//!  /src/lib.rs/raw                       match: path="lib.rs"
//!  /src/tree/node.rs/raw                 match: path="tree/node.rs"
//!  /src/raw                              no match
//! ```
//!
//! # Routing Priority
//!
//! At every segment, literal children are tried first, then parameters in
//! the order they were registered, then the catch-all. A branch that fails
//! deeper in the tree falls back to the next candidate, so the first route
//! that matches in this order wins:
//!
//! ```rust
//! # use trellis::RouteTree;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = RouteTree::new();
//! tree.insert("/user/{id}/{name}/{title}/{files:*}/php", "php")?;
//! tree.insert("/user/{id}/{name}/{title}/{file:*}", "file")?;
//!
//! let matched = tree.at("/user/12/foo/hello/css/style.css")?;
//! assert_eq!(*matched.value, "file");
//! assert_eq!(matched.params.get("file"), Some("css/style.css"));
//!
//! let matched = tree.at("/user/12/foo/hello/css/style.css/php")?;
//! assert_eq!(*matched.value, "php");
//! assert_eq!(matched.params.get("files"), Some("css/style.css"));
//! # Ok(())
//! # }
//! ```
//!
//! # Handlers and Middleware
//!
//! Each route runs a chain of [`Handler`]s: the middleware of the group it
//! was registered in, followed by its own handlers. A handler continues the
//! chain with [`Context::next`] and may stop it with [`Context::abort`].
//! Errors returned by a handler end the chain and are passed to the
//! router's [`ErrorHandler`], with the status of an [`HttpError`] or `500`
//! for any other error.
#![deny(clippy::all)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chain;
mod context;
mod error;
mod handler;
mod params;
mod path;
mod pattern;
mod pool;
mod registry;
mod route;
mod router;
mod tree;

pub use chain::{Chain, Cursor};
pub use context::Context;
pub use error::{BoxError, HttpError, InsertError, InvalidRedirect, MatchError};
pub use handler::{
    boxed, error_response, not_found, BoxedHandler, ErrorHandler, Handler, HandlerResult,
};
pub use params::{Params, ParamsIter};
pub use path::clean_path;
pub use pattern::{Constraint, PathPattern, Segment};
pub use pool::{Pool, Pooled, DEFAULT_MAX_IDLE};
pub use registry::RouteRegistry;
pub use route::Route;
pub use router::{Group, RouteBuilder, Router};
pub use tree::{Match, RouteTree};

pub use http;
pub use http::{Method, StatusCode};
