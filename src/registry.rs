use crate::route::Route;

use std::fmt::{self, Display};
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// Everything but the unreserved characters, so that a value always stays a
// single segment and decodes back to itself.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// The named routes of a router, in registration order.
///
/// Used for reverse routing: given a route name and parameter values, build
/// the URL that would match the route.
#[derive(Clone, Default)]
pub struct RouteRegistry {
    entries: Vec<Arc<Route>>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `route` if it has a name. Unnamed routes are ignored.
    pub fn register(&mut self, route: Arc<Route>) {
        if route.name().is_some() {
            self.entries.push(route);
        }
    }

    /// Returns the first route registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Arc<Route>> {
        self.entries.iter().find(|route| route.name() == Some(name))
    }

    /// The number of named routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no named route has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the URL of the route named `name`.
    ///
    /// Every `:key` placeholder of the route template is replaced by the
    /// percent-encoded value paired with `key`. Placeholders without a pair
    /// are left as they are, and an unknown name yields an empty string.
    ///
    /// Only whole segments are placeholders: in `/v:id/:id` the first segment
    /// is a literal and is never rewritten, and `id` does not touch `:idx`.
    ///
    /// ```
    /// use trellis::{Context, HandlerResult, Router};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = Router::new();
    /// router
    ///     .route(trellis::Method::GET, "/user/{id}")
    ///     .name("user")
    ///     .to(|_: &mut Context| -> HandlerResult { Ok(()) })?;
    ///
    /// assert_eq!(router.url_for("user", &[("id", &10)]), "/user/10");
    /// assert_eq!(router.url_for("user", &[]), "/user/:id");
    /// assert_eq!(router.url_for("nope", &[]), "");
    /// # Ok(())
    /// # }
    /// ```
    pub fn url_for(&self, name: &str, pairs: &[(&str, &dyn Display)]) -> String {
        let route = match self.lookup(name) {
            Some(route) => route,
            None => return String::new(),
        };

        let template = route.template();
        let mut url = String::with_capacity(template.len());
        for (i, segment) in template.split('/').enumerate() {
            if i > 0 {
                url.push('/');
            }

            let value = segment
                .strip_prefix(':')
                .and_then(|key| pairs.iter().find(|(k, _)| *k == key))
                .map(|(_, value)| value.to_string());

            match value {
                Some(value) => url.extend(utf8_percent_encode(&value, SEGMENT)),
                None => url.push_str(segment),
            }
        }
        url
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|route| (route.name().unwrap_or_default(), route.template())),
            )
            .finish()
    }
}
