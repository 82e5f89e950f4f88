use crate::context::Context;
use crate::error::BoxError;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use std::sync::Arc;

/// The result of running a handler.
pub type HandlerResult = Result<(), BoxError>;

/// A unit of request processing: middleware or an endpoint.
///
/// Implemented for every `Fn(&mut Context) -> HandlerResult`, so plain
/// functions and closures can be registered directly. Middleware calls
/// [`Context::next`] to run the rest of the chain; code after that call runs
/// once everything downstream has returned.
///
/// ```
/// use trellis::{Context, HandlerResult};
///
/// fn timing(cx: &mut Context) -> HandlerResult {
///     let start = std::time::Instant::now();
///     let result = cx.next();
///     cx.set("elapsed", start.elapsed());
///     result
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Processes the request.
    fn call(&self, cx: &mut Context) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, cx: &mut Context) -> HandlerResult {
        (self)(cx)
    }
}

/// A type-erased, shareable handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Converts a handler into a [`BoxedHandler`].
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}

/// Receives every error that escapes a handler chain.
///
/// The error handler is terminal: it cannot fail, and nothing runs after it.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Writes the error response.
    fn handle(&self, cx: &mut Context, message: &str, status: StatusCode);
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut Context, &str, StatusCode) + Send + Sync + 'static,
{
    fn handle(&self, cx: &mut Context, message: &str, status: StatusCode) {
        (self)(cx, message, status)
    }
}

/// The default not-found handler, responds `404` with a plain text body.
pub fn not_found(cx: &mut Context) -> HandlerResult {
    plain_text(cx, "404 page not found", StatusCode::NOT_FOUND);
    Ok(())
}

/// The default error handler, replaces the response with `status` and the
/// message as a plain text body.
pub fn error_response(cx: &mut Context, message: &str, status: StatusCode) {
    plain_text(cx, message, status);
}

fn plain_text(cx: &mut Context, message: &str, status: StatusCode) {
    let response = cx.response_mut();
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );

    let body = response.body_mut();
    body.clear();
    body.extend_from_slice(message.as_bytes());
    body.push(b'\n');
}
