use crate::chain::{Chain, Cursor};
use crate::error::{HttpError, InvalidRedirect};
use crate::handler::HandlerResult;
use crate::params::Params;
use crate::registry::RouteRegistry;
use crate::route::Route;
use crate::tree::RouteTree;

use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::{Method, Request, Response, StatusCode};
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use serde::Serialize;

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::Range;
use std::sync::Arc;

type Data = HashMap<String, Box<dyn Any + Send + Sync>>;

/// The state of a single request as it moves through its handler chain.
///
/// A context is owned by one request at a time. Contexts are pooled by the
/// router and reset before every request, nothing carries over from the
/// previous one.
pub struct Context {
    request: Request<Vec<u8>>,
    path: String,
    response: Response<Vec<u8>>,
    route: Option<Arc<Route>>,
    chain: Option<Chain>,
    cursor: Cursor,
    captures: Vec<Range<usize>>,
    data: RwLock<Data>,
    registry: Arc<RouteRegistry>,
}

impl Context {
    /// Creates an empty context with a default request.
    pub fn new() -> Self {
        let request = Request::default();
        let mut path = String::new();
        decode_path(request.uri().path(), &mut path);

        Self {
            request,
            path,
            response: Response::default(),
            route: None,
            chain: None,
            cursor: Cursor::default(),
            captures: Vec::new(),
            data: RwLock::new(HashMap::new()),
            registry: Arc::default(),
        }
    }

    pub(crate) fn reset(&mut self, request: Request<Vec<u8>>, registry: &Arc<RouteRegistry>) {
        self.request = request;
        decode_path(self.request.uri().path(), &mut self.path);
        self.response = Response::default();
        self.route = None;
        self.chain = None;
        self.cursor = Cursor::default();
        self.captures.clear();
        self.data.get_mut().clear();

        if !Arc::ptr_eq(&self.registry, registry) {
            self.registry = Arc::clone(registry);
        }
    }

    // Matches the request path against `tree`, installing the route and its
    // parameters on success.
    pub(crate) fn resolve(&mut self, tree: &RouteTree<Arc<Route>>) -> bool {
        match tree.find(&self.path, &mut self.captures) {
            Some(route) => {
                let route = Arc::clone(route);
                self.install(route);
                true
            }
            None => false,
        }
    }

    pub(crate) fn install(&mut self, route: Arc<Route>) {
        self.install_chain(route.handlers());
        self.route = Some(route);
    }

    pub(crate) fn install_chain(&mut self, chain: &Chain) {
        self.cursor.reset(chain.len());
        self.chain = Some(chain.clone());
    }

    /// Runs the next handler in the chain.
    ///
    /// Middleware calls this to hand the request downstream; the call returns
    /// once the rest of the chain has finished, or with the first error a
    /// handler returned. Once the chain is exhausted or aborted this does
    /// nothing.
    pub fn next(&mut self) -> HandlerResult {
        let index = match self.cursor.advance() {
            Some(index) => index,
            None => return Ok(()),
        };

        let handler = match self.chain.as_ref().and_then(|chain| chain.get(index)) {
            Some(handler) => Arc::clone(handler),
            None => return Ok(()),
        };
        handler.call(self)
    }

    /// Skips every handler that has not started yet.
    ///
    /// Handlers already running, such as middleware waiting on
    /// [`next`](Context::next), still finish their own work.
    pub fn abort(&mut self) {
        self.cursor.abort();
    }

    /// Returns `true` once the chain was aborted or has run to completion.
    pub fn is_aborted(&self) -> bool {
        self.cursor.is_aborted()
    }

    /// The incoming request.
    pub fn request(&self) -> &Request<Vec<u8>> {
        &self.request
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// The percent-decoded request path that routes are matched against.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The matched route, `None` while the not-found handler runs.
    pub fn route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    /// Returns the value of the path parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        let route = self.route.as_ref()?;
        route
            .pattern()
            .param_names()
            .zip(&self.captures)
            .find(|(key, _)| *key == name)
            .map(|(_, range)| &self.path[range.clone()])
    }

    /// All path parameters, in declaration order.
    pub fn params(&self) -> Params<'_, '_> {
        match &self.route {
            Some(route) => Params::from_captures(
                route.pattern().param_names(),
                &self.path,
                &self.captures,
            ),
            None => Params::new(),
        }
    }

    /// Stores a value for later handlers of this request.
    ///
    /// Takes `&self` so that threads spawned by a handler can share the
    /// context.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.data.write().insert(key.into(), Box::new(value));
    }

    /// Returns a copy of the value stored under `key`, if it is a `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.data.read().get(key)?.downcast_ref::<T>().cloned()
    }

    /// Sets the response status.
    pub fn status(&mut self, status: StatusCode) {
        *self.response.status_mut() = status;
    }

    /// Appends bytes to the response body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.response.body_mut().extend_from_slice(bytes.as_ref());
    }

    /// Responds with a plain text body.
    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.respond(status, "text/plain; charset=utf-8", body.as_ref().as_bytes());
    }

    /// Responds with `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> HandlerResult {
        let body = serde_json::to_vec(value)?;
        self.respond(status, "application/json; charset=utf-8", &body);
        Ok(())
    }

    fn respond(&mut self, status: StatusCode, content_type: &'static str, body: &[u8]) {
        *self.response.status_mut() = status;
        self.response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

        let buf = self.response.body_mut();
        buf.clear();
        buf.extend_from_slice(body);
    }

    /// Redirects to `location` and aborts the chain.
    ///
    /// Fails if `status` is not a redirect code (300 through 308).
    pub fn redirect(&mut self, location: &str, status: StatusCode) -> HandlerResult {
        if !(300..=308).contains(&status.as_u16()) {
            return Err(InvalidRedirect(status).into());
        }

        let location = HeaderValue::try_from(location)?;
        self.abort();
        *self.response.status_mut() = status;
        self.response.headers_mut().insert(LOCATION, location);
        Ok(())
    }

    /// Redirects to the URL of the route named `name`.
    pub fn route_redirect(
        &mut self,
        name: &str,
        pairs: &[(&str, &dyn Display)],
        status: StatusCode,
    ) -> HandlerResult {
        let url = self.url_for(name, pairs);
        if url.is_empty() {
            return Err(HttpError::with_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("no route named '{name}'"),
            )
            .into());
        }

        self.redirect(&url, status)
    }

    /// Builds the URL of a named route, see [`RouteRegistry::url_for`].
    pub fn url_for(&self, name: &str, pairs: &[(&str, &dyn Display)]) -> String {
        self.registry.url_for(name, pairs)
    }

    /// The response written so far.
    pub fn response(&self) -> &Response<Vec<u8>> {
        &self.response
    }

    /// Mutable access to the response, e.g. to set headers.
    pub fn response_mut(&mut self) -> &mut Response<Vec<u8>> {
        &mut self.response
    }

    pub(crate) fn take_response(&mut self) -> Response<Vec<u8>> {
        std::mem::take(&mut self.response)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("path", &self.path)
            .field("route", &self.route.as_ref().map(|route| route.path()))
            .field("cursor", &self.cursor)
            .field("status", &self.response.status())
            .finish()
    }
}

// Writes the percent-decoded form of `raw` into `path`, reusing its
// allocation. Invalid UTF-8 is replaced rather than rejected.
fn decode_path(raw: &str, path: &mut String) {
    path.clear();
    path.push_str(&percent_decode_str(raw).decode_utf8_lossy());
}
