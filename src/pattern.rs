//! Route pattern compilation.
//!
//! A route pattern is a `/`-separated list of segments:
//!
//! ```text
//!  Syntax            Type
//!  users             literal, matched verbatim
//!  {id}              named parameter, matches one segment
//!  {id:[0-9]+}       constrained parameter, the segment must match the regex
//!  {files:*}         catch-all, matches one or more segments
//! ```
//!
//! Constraints are anchored at both ends and compiled once, when the route is
//! registered. A catch-all may be followed by literal segments, as in
//! `/src/{path:*}/raw`, but by no other parameter.
use crate::error::InsertError;

use regex::Regex;
use std::fmt;

/// A compiled regular expression that must match a whole segment.
#[derive(Clone, Debug)]
pub struct Constraint {
    source: String,
    regex: Regex,
}

impl Constraint {
    fn new(name: &str, source: &str) -> Result<Self, InsertError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|source| {
            InsertError::InvalidConstraint {
                name: name.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    /// Returns `true` if the whole segment matches.
    pub fn is_match(&self, segment: &str) -> bool {
        self.regex.is_match(segment)
    }

    /// The expression as written in the route, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Constraint {}

/// One component of a route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Matched verbatim.
    Literal(String),
    /// Matches exactly one non-empty segment.
    Param(String),
    /// Matches one segment that fully matches the constraint.
    Constrained(String, Constraint),
    /// Matches one or more segments, captured as a single `/`-joined value.
    CatchAll(String),
}

impl Segment {
    fn parse(segment: &str) -> Result<Segment, InsertError> {
        let inner = match segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            Some(inner) => inner,
            None => return Ok(Segment::Literal(segment.to_owned())),
        };

        let (name, pattern) = match inner.split_once(':') {
            Some((name, pattern)) => (name, Some(pattern)),
            None => (inner, None),
        };

        if name.is_empty() {
            return Err(InsertError::UnnamedParam);
        }

        Ok(match pattern {
            None | Some("") => Segment::Param(name.to_owned()),
            Some("*") => Segment::CatchAll(name.to_owned()),
            Some(pattern) => Segment::Constrained(name.to_owned(), Constraint::new(name, pattern)?),
        })
    }

    /// The parameter name bound by this segment, if any.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param(name) | Segment::Constrained(name, _) | Segment::CatchAll(name) => {
                Some(name)
            }
        }
    }
}

/// A compiled route pattern.
///
/// ```
/// use trellis::PathPattern;
///
/// let pattern = PathPattern::parse("/user/{id:[0-9]+}/{action}").unwrap();
/// assert_eq!(pattern.template(), "/user/:id/:action");
/// assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["id", "action"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a route pattern.
    ///
    /// Fails if the path is not absolute, contains an empty segment, has an
    /// unnamed parameter, an invalid constraint or a misplaced catch-all.
    pub fn parse(path: &str) -> Result<PathPattern, InsertError> {
        if !path.starts_with('/') {
            return Err(InsertError::InvalidPath {
                path: path.to_owned(),
            });
        }

        let rest = &path[1..];
        let trimmed = rest.strip_suffix('/').unwrap_or(rest);
        if trimmed.is_empty() && path.len() > 1 {
            return Err(InsertError::InvalidPath {
                path: path.to_owned(),
            });
        }

        let mut segments = Vec::new();
        let mut template = Vec::new();
        let mut catch_all = false;

        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                if part.is_empty() {
                    return Err(InsertError::InvalidPath {
                        path: path.to_owned(),
                    });
                }

                let segment = Segment::parse(part)?;
                match segment {
                    Segment::Literal(_) => {}
                    Segment::CatchAll(_) if catch_all => return Err(InsertError::MultipleCatchAll),
                    Segment::CatchAll(_) => catch_all = true,
                    _ if catch_all => return Err(InsertError::InvalidCatchAll),
                    _ => {}
                }

                template.push(match segment.param_name() {
                    Some(name) => format!(":{name}"),
                    None => part.to_owned(),
                });
                segments.push(segment);
            }
        }

        let mut rendered = String::with_capacity(path.len());
        rendered.push('/');
        rendered.push_str(&template.join("/"));
        if trimmed.len() < rest.len() {
            rendered.push('/');
        }

        Ok(PathPattern {
            raw: path.to_owned(),
            template: rendered,
            segments,
        })
    }

    /// The path as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The path with every parameter rewritten to `:name`, used for URL generation.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The names of all parameters, in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// The number of parameters bound by this pattern.
    pub fn param_count(&self) -> usize {
        self.param_names().count()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_segments() {
        let pattern = PathPattern::parse("/user/{id}/{page:[0-9]+}/{rest:*}").unwrap();
        let segments = pattern.segments();

        assert_eq!(segments[0], Segment::Literal("user".into()));
        assert_eq!(segments[1], Segment::Param("id".into()));
        match &segments[2] {
            Segment::Constrained(name, constraint) => {
                assert_eq!(name, "page");
                assert_eq!(constraint.as_str(), "[0-9]+");
                assert!(constraint.is_match("12"));
                assert!(!constraint.is_match("12a"));
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert_eq!(segments[3], Segment::CatchAll("rest".into()));
    }

    #[test]
    fn constraints_are_anchored() {
        let pattern = PathPattern::parse("/{kind:a|b}").unwrap();
        let Segment::Constrained(_, constraint) = &pattern.segments()[0] else {
            panic!("expected a constrained parameter");
        };

        assert!(constraint.is_match("a"));
        assert!(constraint.is_match("b"));
        assert!(!constraint.is_match("ab"));
        assert!(!constraint.is_match("xb"));
    }

    #[test]
    fn builds_template() {
        let pattern = PathPattern::parse("/user/{id:[0-9]}/{action:*}").unwrap();
        assert_eq!(pattern.template(), "/user/:id/:action");
        assert_eq!(pattern.param_count(), 2);

        let pattern = PathPattern::parse("/users/{id}/").unwrap();
        assert_eq!(pattern.template(), "/users/:id/");

        let pattern = PathPattern::parse("/").unwrap();
        assert_eq!(pattern.template(), "/");
        assert!(pattern.segments().is_empty());
    }

    #[test]
    fn quantifier_braces_stay_in_constraint() {
        let pattern = PathPattern::parse("/year/{year:[0-9]{4}}").unwrap();
        assert_eq!(pattern.template(), "/year/:year");
        let Segment::Constrained(name, constraint) = &pattern.segments()[1] else {
            panic!("expected a constrained parameter");
        };
        assert_eq!(name, "year");
        assert!(constraint.is_match("2024"));
        assert!(!constraint.is_match("24"));
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("/page/{page:[0-9+}"),
            Err(InsertError::InvalidConstraint { ref name, .. }) if name == "page"
        ));
        assert_eq!(PathPattern::parse("/{}"), Err(InsertError::UnnamedParam));
        assert_eq!(PathPattern::parse("/{:[a-z]+}"), Err(InsertError::UnnamedParam));
        assert_eq!(
            PathPattern::parse("/src/{a:*}/{b}"),
            Err(InsertError::InvalidCatchAll)
        );
        assert_eq!(
            PathPattern::parse("/src/{a:*}/x/{b:*}"),
            Err(InsertError::MultipleCatchAll)
        );
        assert!(matches!(
            PathPattern::parse("users"),
            Err(InsertError::InvalidPath { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/a//b"),
            Err(InsertError::InvalidPath { .. })
        ));
        assert!(matches!(
            PathPattern::parse("//"),
            Err(InsertError::InvalidPath { .. })
        ));
    }

    #[test]
    fn catch_all_followed_by_literals() {
        let pattern = PathPattern::parse("/src/{files:*}/raw/php").unwrap();
        assert_eq!(pattern.template(), "/src/:files/raw/php");
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["files"]);
    }
}
