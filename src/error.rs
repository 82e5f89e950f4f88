use http::StatusCode;
use serde::{Serialize, Serializer};

/// The error type returned by handlers.
///
/// Any error can be propagated out of a handler with `?`. Errors that are an
/// [`HttpError`] keep their status code when they reach the error handler,
/// everything else is reported as a `500 Internal Server Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Represents errors that can occur when registering a new route.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InsertError {
    /// Route paths must be absolute and must not contain empty segments.
    #[error("invalid route path '{path}': paths must begin with '/' and contain no empty segments")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },
    /// Parameters must be registered with a name.
    #[error("parameters must be registered with a name")]
    UnnamedParam,
    /// A catch-all parameter may only be followed by literal segments.
    #[error("catch-all parameters may only be followed by literal segments")]
    InvalidCatchAll,
    /// Only one catch-all parameter is allowed per route.
    #[error("only one catch-all parameter is allowed per route")]
    MultipleCatchAll,
    /// The constraint of a parameter is not a valid regular expression.
    #[error("invalid constraint for parameter '{name}': {source}")]
    InvalidConstraint {
        /// The name of the constrained parameter.
        name: String,
        /// The regular expression compile error.
        #[source]
        source: regex::Error,
    },
}

/// A failed match attempt.
///
/// ```
/// use trellis::{MatchError, RouteTree};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = RouteTree::new();
/// tree.insert("/home", "Welcome!")?;
///
/// // no routes match
/// if let Err(err) = tree.at("/foobar") {
///     assert_eq!(err, MatchError::NotFound);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum MatchError {
    /// No matching route was found.
    #[error("matching route not found")]
    NotFound,
}

/// A handler failure that carries the HTTP status code to respond with.
///
/// ```
/// use trellis::{HttpError, StatusCode};
///
/// let err = HttpError::new(StatusCode::NOT_FOUND);
/// assert_eq!(err.message(), "Not Found");
///
/// let err = HttpError::with_message(StatusCode::FORBIDDEN, "members only");
/// assert_eq!(err.to_string(), "members only");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    #[serde(serialize_with = "serialize_status")]
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Creates an error whose message is the canonical reason phrase of `status`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: status.canonical_reason().unwrap_or_default().to_owned(),
        }
    }

    /// Creates an error with a custom message.
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The status code to respond with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message handed to the error handler.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StatusCode> for HttpError {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// A redirect was requested with a status code outside of the `3xx` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid redirect status code: {0}")]
pub struct InvalidRedirect(pub StatusCode);
