use crate::chain::Chain;
use crate::pattern::PathPattern;

use http::Method;

/// A registered route.
///
/// The handler chain is the group middleware followed by the route's own
/// handlers, concatenated once at registration. Routes are never modified
/// afterwards.
#[derive(Debug)]
pub struct Route {
    method: Method,
    pattern: PathPattern,
    name: Option<String>,
    handlers: Chain,
}

impl Route {
    pub(crate) fn new(
        method: Method,
        pattern: PathPattern,
        name: Option<String>,
        handlers: Chain,
    ) -> Self {
        Self {
            method,
            pattern,
            name,
            handlers,
        }
    }

    /// The method this route answers.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The full path as registered, including group prefixes.
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The URL template, e.g. `/user/:id`.
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// The name used for reverse routing.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The complete handler chain.
    pub fn handlers(&self) -> &Chain {
        &self.handlers
    }
}
