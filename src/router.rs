//! Route registration and request dispatch.
//!
//! Routes are registered up front on a [`Router`], either directly or through
//! a [`Group`] that adds a path prefix and middleware. Every route stores its
//! complete handler chain, the group middleware followed by its own handlers,
//! so dispatch only has to look up the route and run the chain:
//!
//! ```
//! use trellis::{Context, HandlerResult, Router, StatusCode};
//! use trellis::http::Request;
//!
//! fn show_user(cx: &mut Context) -> HandlerResult {
//!     let id = cx.param("id").unwrap_or_default().to_owned();
//!     cx.text(StatusCode::OK, format!("user {id}"));
//!     Ok(())
//! }
//!
//! fn auth(cx: &mut Context) -> HandlerResult {
//!     cx.set("user", 1_u64);
//!     cx.next()
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.get("/", |cx: &mut Context| -> HandlerResult {
//!     cx.text(StatusCode::OK, "home");
//!     Ok(())
//! })?;
//!
//! let mut api = router.group("/api");
//! api.wrap(auth);
//! api.get("/users/{id:[0-9]+}", show_user)?;
//!
//! let response = router.serve(Request::get("/api/users/7").body(Vec::new())?);
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body(), b"user 7");
//!
//! let response = router.serve(Request::get("/api/users/x").body(Vec::new())?);
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! # Ok(())
//! # }
//! ```
//!
//! Registration is not synchronized. Build the router first, then share it
//! (for example in an `Arc`) across the threads that call
//! [`serve`](Router::serve).
use crate::chain::Chain;
use crate::context::Context;
use crate::error::{BoxError, HttpError, InsertError};
use crate::handler::{self, boxed, BoxedHandler, ErrorHandler, Handler};
use crate::path;
use crate::pattern::PathPattern;
use crate::pool::Pool;
use crate::registry::RouteRegistry;
use crate::route::Route;
use crate::tree::RouteTree;

use http::{Method, Request, Response, StatusCode};
use tracing::{debug, error, trace};

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

// The methods registered by `any`.
const ANY: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
];

// Everything registration writes to, shared between a router and its groups.
#[derive(Default)]
struct Routes {
    trees: HashMap<Method, RouteTree<Arc<Route>>>,
    registry: Arc<RouteRegistry>,
    all: Vec<Arc<Route>>,
}

impl Routes {
    fn add(
        &mut self,
        scope: &Scope,
        method: Method,
        path: &str,
        name: Option<String>,
        handlers: Vec<BoxedHandler>,
    ) -> Result<Arc<Route>, InsertError> {
        let pattern = PathPattern::parse(&path::join(&scope.prefix, path))?;

        let mut chain = Vec::with_capacity(scope.middleware.len() + handlers.len());
        chain.extend(scope.middleware.iter().cloned());
        chain.extend(handlers);

        let route = Arc::new(Route::new(method.clone(), pattern, name, Chain::new(chain)));
        let tree = self.trees.entry(method).or_default();
        if tree
            .insert_pattern(route.pattern(), Arc::clone(&route))
            .is_some()
        {
            debug!(method = %route.method(), path = route.path(), "replaced existing route");
        }

        Arc::make_mut(&mut self.registry).register(Arc::clone(&route));
        self.all.push(Arc::clone(&route));

        debug!(
            method = %route.method(),
            path = route.path(),
            name = route.name(),
            handlers = route.handlers().len(),
            "registered route"
        );
        Ok(route)
    }
}

// The path prefix and middleware inherited by routes registered through a
// router or group.
#[derive(Clone)]
struct Scope {
    prefix: String,
    middleware: Vec<BoxedHandler>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            prefix: "/".to_owned(),
            middleware: Vec::new(),
        }
    }
}

// Registration methods shared by `Router` and `Group`, both of which provide a
// `parts` method splitting them into the route table and their scope.
macro_rules! registration {
    ($($method:ident => $constant:ident),* $(,)?) => {
        /// Appends middleware to this scope.
        ///
        /// Only routes registered afterwards run it. Groups created earlier
        /// keep the middleware they were created with.
        pub fn wrap(&mut self, handler: impl Handler) -> &mut Self {
            self.parts().1.middleware.push(boxed(handler));
            self
        }

        /// Creates a group of routes under `prefix`.
        ///
        /// The group starts out with a copy of this scope's middleware.
        /// Changes made to either one afterwards do not affect the other.
        pub fn group(&mut self, prefix: &str) -> Group<'_> {
            let (routes, scope) = self.parts();
            let scope = Scope {
                prefix: path::join(&scope.prefix, prefix),
                middleware: scope.middleware.clone(),
            };
            Group { routes, scope }
        }

        /// Starts building a route, to name it or add route-level middleware.
        pub fn route(&mut self, method: Method, path: &str) -> RouteBuilder<'_> {
            let (routes, scope) = self.parts();
            RouteBuilder {
                routes,
                scope,
                method,
                path: path.to_owned(),
                name: None,
                handlers: Vec::new(),
            }
        }

        /// Registers a route with an explicit handler chain.
        ///
        /// The chain of the route is this scope's middleware followed by
        /// `handlers`. Registering a pattern that already exists for `method`
        /// replaces the previous route.
        pub fn handle(
            &mut self,
            method: Method,
            path: &str,
            name: Option<&str>,
            handlers: Vec<BoxedHandler>,
        ) -> Result<Arc<Route>, InsertError> {
            let (routes, scope) = self.parts();
            routes.add(scope, method, path, name.map(str::to_owned), handlers)
        }

        $(
            #[doc = concat!("Registers a handler for `", stringify!($constant), "` requests.")]
            pub fn $method(
                &mut self,
                path: &str,
                handler: impl Handler,
            ) -> Result<Arc<Route>, InsertError> {
                self.handle(Method::$constant, path, None, vec![boxed(handler)])
            }
        )*

        /// Registers a handler for every common method.
        pub fn any(
            &mut self,
            path: &str,
            handler: impl Handler,
        ) -> Result<Vec<Arc<Route>>, InsertError> {
            self.on(&ANY, path, handler)
        }

        /// Registers a handler for each of `methods`.
        pub fn on(
            &mut self,
            methods: &[Method],
            path: &str,
            handler: impl Handler,
        ) -> Result<Vec<Arc<Route>>, InsertError> {
            let handler = boxed(handler);
            methods
                .iter()
                .map(|method| self.handle(method.clone(), path, None, vec![Arc::clone(&handler)]))
                .collect()
        }
    };
}

/// An HTTP request router.
pub struct Router {
    routes: Routes,
    scope: Scope,
    not_found: Chain,
    error_handler: Arc<dyn ErrorHandler>,
    pool: Pool<Context>,
}

impl Router {
    /// Creates a router with the default not-found and error handlers.
    pub fn new() -> Self {
        Self {
            routes: Routes::default(),
            scope: Scope::default(),
            not_found: Chain::new(vec![boxed(handler::not_found)]),
            error_handler: Arc::new(handler::error_response),
            pool: Pool::new(Context::new),
        }
    }

    fn parts(&mut self) -> (&mut Routes, &mut Scope) {
        (&mut self.routes, &mut self.scope)
    }

    registration! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
    }

    /// Sets the handler that runs when no route matches.
    ///
    /// It runs on its own, without any middleware.
    pub fn set_not_found(&mut self, handler: impl Handler) -> &mut Self {
        self.not_found = Chain::new(vec![boxed(handler)]);
        self
    }

    /// Sets the handler that receives errors returned by handler chains.
    pub fn set_error_handler(&mut self, handler: impl ErrorHandler) -> &mut Self {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Replaces the pool request contexts are taken from.
    pub fn with_pool(mut self, pool: Pool<Context>) -> Self {
        self.pool = pool;
        self
    }

    /// Dispatches a request and returns the response written by its handlers.
    pub fn serve(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut cx = self.pool.acquire();
        cx.reset(request, &self.routes.registry);
        trace!(method = %cx.method(), path = cx.path(), "dispatching request");

        let matched = match self.routes.trees.get(cx.method()) {
            Some(tree) => cx.resolve(tree),
            None => false,
        };

        if !matched {
            debug!(method = %cx.method(), path = cx.path(), "no route matched");
            cx.install_chain(&self.not_found);
        }

        if let Err(err) = cx.next() {
            self.handle_error(&mut cx, err);
        }

        cx.take_response()
    }

    fn handle_error(&self, cx: &mut Context, err: BoxError) {
        match err.downcast_ref::<HttpError>() {
            Some(err) => self.error_handler.handle(cx, err.message(), err.status()),
            None => {
                error!(
                    method = %cx.method(),
                    path = cx.path(),
                    error = %err,
                    "handler failed"
                );
                self.error_handler.handle(
                    cx,
                    "Internal Server Error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
        }
    }

    /// Builds the URL of a named route, see [`RouteRegistry::url_for`].
    pub fn url_for(&self, name: &str, pairs: &[(&str, &dyn Display)]) -> String {
        self.routes.registry.url_for(name, pairs)
    }

    /// The named routes.
    pub fn registry(&self) -> &RouteRegistry {
        &self.routes.registry
    }

    /// Every registered route, in registration order.
    ///
    /// A route that was replaced by a later registration of the same pattern
    /// is still listed.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.all.iter()
    }

    /// The route tree for `method`, if any route was registered for it.
    pub fn tree(&self, method: &Method) -> Option<&RouteTree<Arc<Route>>> {
        self.routes.trees.get(method)
    }

    /// The pool request contexts are taken from.
    pub fn pool(&self) -> &Pool<Context> {
        &self.pool
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.all.len())
            .field("methods", &self.routes.trees.keys().collect::<Vec<_>>())
            .field("registry", &self.routes.registry)
            .field("pool", &self.pool)
            .finish()
    }
}

/// A set of routes sharing a path prefix and middleware.
///
/// Created with [`Router::group`] or [`Group::group`]. Routes registered on a
/// group are added to the router it was created from.
pub struct Group<'r> {
    routes: &'r mut Routes,
    scope: Scope,
}

impl Group<'_> {
    fn parts(&mut self) -> (&mut Routes, &mut Scope) {
        (&mut *self.routes, &mut self.scope)
    }

    registration! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
    }

    /// The path prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.scope.prefix
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.scope.prefix)
            .field("middleware", &self.scope.middleware.len())
            .finish()
    }
}

/// A route under construction, see [`Router::route`].
///
/// ```
/// use trellis::{Context, HandlerResult, Method, Router};
///
/// fn audit(cx: &mut Context) -> HandlerResult {
///     cx.next()
/// }
///
/// # fn main() -> Result<(), trellis::InsertError> {
/// let mut router = Router::new();
/// let route = router
///     .route(Method::DELETE, "/user/{id}")
///     .name("delete_user")
///     .with(audit)
///     .to(|_: &mut Context| -> HandlerResult { Ok(()) })?;
///
/// assert_eq!(route.name(), Some("delete_user"));
/// assert_eq!(route.handlers().len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct RouteBuilder<'a> {
    routes: &'a mut Routes,
    scope: &'a Scope,
    method: Method,
    path: String,
    name: Option<String>,
    handlers: Vec<BoxedHandler>,
}

impl RouteBuilder<'_> {
    /// Names the route for reverse routing.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds middleware that only runs for this route.
    pub fn with(mut self, handler: impl Handler) -> Self {
        self.handlers.push(boxed(handler));
        self
    }

    /// Registers the route with `handler` at the end of its chain.
    pub fn to(mut self, handler: impl Handler) -> Result<Arc<Route>, InsertError> {
        self.handlers.push(boxed(handler));
        self.routes
            .add(self.scope, self.method, &self.path, self.name, self.handlers)
    }
}

impl fmt::Debug for RouteBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .finish()
    }
}
