//! The segment trie that resolves request paths to routes.
//!
//! Every node has three kinds of children: literal children keyed by their
//! exact text, parameter children tried in insertion order, and at most one
//! catch-all child. Lookup is a depth-first search:
//!
//! 1. a literal child equal to the next segment is tried first,
//! 2. then every parameter child that accepts the segment,
//! 3. then the catch-all child, which claims as many segments as it can while
//!    still letting the literals registered after it match.
//!
//! A failed branch falls through to the next candidate at the same depth, and
//! the first complete match wins. The cost is exponential in the number of
//! ambiguous sibling parameters per level, which stays small for real route
//! tables.
use crate::error::{InsertError, MatchError};
use crate::params::Params;
use crate::pattern::{Constraint, PathPattern, Segment};

use std::fmt;
use std::ops::Range;

/// A successfully matched route.
#[derive(Debug)]
pub struct Match<'t, 'p, V> {
    /// The value stored under the matched route.
    pub value: &'t V,
    /// The route parameters, in declaration order.
    pub params: Params<'t, 'p>,
}

/// A trie of route patterns, mapping each pattern to a value.
///
/// ```
/// use trellis::RouteTree;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = RouteTree::new();
/// tree.insert("/home", "Welcome!")?;
/// tree.insert("/users/{id:[0-9]+}", "A User")?;
///
/// let matched = tree.at("/users/978")?;
/// assert_eq!(matched.params.get("id"), Some("978"));
/// assert_eq!(*matched.value, "A User");
///
/// assert!(tree.at("/users/abc").is_err());
/// # Ok(())
/// # }
/// ```
pub struct RouteTree<T> {
    root: Node<T>,
}

impl<T> RouteTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: Node::new(Kind::Root),
        }
    }

    /// Compiles `route` and stores `value` under it.
    ///
    /// Registering the same pattern again replaces the previous value.
    pub fn insert(&mut self, route: impl AsRef<str>, value: T) -> Result<(), InsertError> {
        let pattern = PathPattern::parse(route.as_ref())?;
        self.insert_pattern(&pattern, value);
        Ok(())
    }

    /// Stores `value` under an already compiled pattern, returning the value
    /// it replaced, if any.
    pub fn insert_pattern(&mut self, pattern: &PathPattern, value: T) -> Option<T> {
        let mut node = &mut self.root;
        for segment in pattern.segments() {
            node = node.child_mut(segment);
        }

        let leaf = Leaf {
            value,
            keys: pattern.param_names().map(str::to_owned).collect(),
        };
        node.leaf.replace(leaf).map(|leaf| leaf.value)
    }

    /// Tries to match `path` against the registered routes.
    pub fn at<'t, 'p>(&'t self, path: &'p str) -> Result<Match<'t, 'p, T>, MatchError> {
        let path = normalize(path);
        let mut captures = Vec::new();

        match self.root.search(path, &mut captures) {
            Some(leaf) => Ok(Match {
                value: &leaf.value,
                params: Params::from_captures(leaf.keys(), path, &captures),
            }),
            None => Err(MatchError::NotFound),
        }
    }

    /// Matches `path` and records the byte ranges of every parameter value in
    /// `captures`, reusing its allocation.
    ///
    /// The ranges index into `path` and line up with the parameter names of
    /// the matched pattern.
    pub fn find(&self, path: &str, captures: &mut Vec<Range<usize>>) -> Option<&T> {
        captures.clear();
        self.root
            .search(normalize(path), captures)
            .map(|leaf| &leaf.value)
    }
}

impl<T> Default for RouteTree<T> {
    fn default() -> Self {
        RouteTree::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RouteTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.dump(f, 0)
    }
}

fn normalize(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Kind {
    Root,
    Static(String),
    Param(String, Option<Constraint>),
    CatchAll(String),
}

// The terminal payload of a node along with the parameter names of the
// pattern that ends here.
struct Leaf<T> {
    value: T,
    keys: Box<[String]>,
}

impl<T> Leaf<T> {
    fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

struct Node<T> {
    kind: Kind,
    statics: Vec<Node<T>>,
    params: Vec<Node<T>>,
    catch_all: Option<Box<Node<T>>>,
    leaf: Option<Leaf<T>>,
}

impl<T> Node<T> {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            statics: Vec::new(),
            params: Vec::new(),
            catch_all: None,
            leaf: None,
        }
    }

    // Returns the child for `segment`, creating it if needed.
    fn child_mut(&mut self, segment: &Segment) -> &mut Node<T> {
        match segment {
            Segment::Literal(text) => {
                let i = match self
                    .statics
                    .iter()
                    .position(|child| matches!(&child.kind, Kind::Static(key) if key == text))
                {
                    Some(i) => i,
                    None => {
                        self.statics.push(Node::new(Kind::Static(text.clone())));
                        self.statics.len() - 1
                    }
                };
                &mut self.statics[i]
            }
            Segment::Param(name) => self.param_child_mut(name, None),
            Segment::Constrained(name, constraint) => {
                self.param_child_mut(name, Some(constraint))
            }
            // a node has at most one catch-all child, shared by every route
            // that has a catch-all at this position
            Segment::CatchAll(name) => self
                .catch_all
                .get_or_insert_with(|| Box::new(Node::new(Kind::CatchAll(name.clone())))),
        }
    }

    fn param_child_mut(&mut self, name: &str, constraint: Option<&Constraint>) -> &mut Node<T> {
        let i = match self.params.iter().position(|child| {
            matches!(&child.kind, Kind::Param(n, c) if n == name && c.as_ref() == constraint)
        }) {
            Some(i) => i,
            None => {
                let kind = Kind::Param(name.to_owned(), constraint.cloned());
                self.params.push(Node::new(kind));
                self.params.len() - 1
            }
        };
        &mut self.params[i]
    }

    fn accepts(&self, segment: &str) -> bool {
        match &self.kind {
            Kind::Param(_, Some(constraint)) => constraint.is_match(segment),
            Kind::Param(_, None) => true,
            _ => false,
        }
    }

    fn has_children(&self) -> bool {
        !self.statics.is_empty() || !self.params.is_empty() || self.catch_all.is_some()
    }

    fn search(&self, path: &str, captures: &mut Vec<Range<usize>>) -> Option<&Leaf<T>> {
        if !path.starts_with('/') {
            return None;
        }
        self.find(path, 0, captures)
    }

    // Searches for a route matching `path[pos..]`, where `pos` is either the
    // end of the path or the index of a '/'.
    //
    // A failed search leaves `captures` exactly as it found it.
    fn find(
        &self,
        path: &str,
        pos: usize,
        captures: &mut Vec<Range<usize>>,
    ) -> Option<&Leaf<T>> {
        let rest = &path[pos..];
        if rest.is_empty() || rest == "/" {
            return self.leaf.as_ref();
        }

        let start = pos + 1;
        let end = path[start..].find('/').map_or(path.len(), |i| start + i);
        let segment = &path[start..end];
        if segment.is_empty() {
            return None;
        }

        let literal = self
            .statics
            .iter()
            .find(|child| matches!(&child.kind, Kind::Static(key) if key == segment));
        if let Some(child) = literal {
            if let Some(leaf) = child.find(path, end, captures) {
                return Some(leaf);
            }
        }

        for child in self.params.iter().filter(|child| child.accepts(segment)) {
            captures.push(start..end);
            if let Some(leaf) = child.find(path, end, captures) {
                return Some(leaf);
            }
            captures.pop();
        }

        self.catch_all
            .as_ref()
            .and_then(|child| child.claim(path, start, captures))
    }

    // Called on a catch-all node with the remaining segments starting at
    // `start`. Claims that leave segments for the literals after the catch-all
    // are tried longest first, then the catch-all takes everything.
    fn claim(
        &self,
        path: &str,
        start: usize,
        captures: &mut Vec<Range<usize>>,
    ) -> Option<&Leaf<T>> {
        let limit = path.strip_suffix('/').map_or(path.len(), str::len);
        if limit <= start {
            return None;
        }

        if self.has_children() {
            for (i, _) in path[start..limit].rmatch_indices('/') {
                let end = start + i;
                if end == start {
                    break;
                }

                captures.push(start..end);
                if let Some(leaf) = self.find(path, end, captures) {
                    return Some(leaf);
                }
                captures.pop();
            }
        }

        let leaf = self.leaf.as_ref()?;
        captures.push(start..limit);
        Some(leaf)
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result
    where
        T: fmt::Debug,
    {
        let indent = "    ".repeat(level);
        match &self.kind {
            Kind::Root => write!(f, "{indent}/")?,
            Kind::Static(key) => write!(f, "{indent}{key}")?,
            Kind::Param(name, None) => write!(f, "{indent}{{{name}}}")?,
            Kind::Param(name, Some(constraint)) => {
                write!(f, "{indent}{{{name}:{}}}", constraint.as_str())?
            }
            Kind::CatchAll(name) => write!(f, "{indent}{{{name}:*}}")?,
        }
        if let Some(leaf) = &self.leaf {
            write!(f, " => {:?} {:?}", leaf.value, leaf.keys)?;
        }
        writeln!(f)?;

        let children = self
            .statics
            .iter()
            .chain(&self.params)
            .chain(self.catch_all.as_deref());
        for child in children {
            child.dump(f, level + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_existing_children() {
        let mut tree = RouteTree::new();
        tree.insert("/user/{id}/add", 1).unwrap();
        tree.insert("/user/{id}/edit", 2).unwrap();
        tree.insert("/user/{name}/del", 3).unwrap();
        tree.insert("/user/{id:[0-9]+}/show", 4).unwrap();

        let user = &tree.root.statics[0];
        assert_eq!(tree.root.statics.len(), 1);
        assert_eq!(user.params.len(), 3);
        assert_eq!(user.params[0].statics.len(), 2);
    }

    #[test]
    fn catch_all_child_is_shared() {
        let mut tree = RouteTree::new();
        tree.insert("/src/{files:*}/php", 1).unwrap();
        tree.insert("/src/{file:*}", 2).unwrap();

        let src = &tree.root.statics[0];
        let catch_all = src.catch_all.as_ref().unwrap();
        assert_eq!(catch_all.kind, Kind::CatchAll("files".into()));
        assert_eq!(&*catch_all.leaf.as_ref().unwrap().keys, ["file".to_owned()]);
        assert_eq!(catch_all.statics.len(), 1);
    }

    #[test]
    fn failed_search_restores_captures() {
        let mut tree = RouteTree::new();
        tree.insert("/{a}/{b}/x", 1).unwrap();
        tree.insert("/{c}/y", 2).unwrap();

        let mut captures = vec![0..0; 4];
        assert_eq!(tree.find("/one/y", &mut captures), Some(&2));
        assert_eq!(captures, [1..4]);

        assert_eq!(tree.find("/one/two/z", &mut captures), None);
        assert!(captures.is_empty());
    }

    #[test]
    fn dump_lists_every_node() {
        let mut tree = RouteTree::new();
        tree.insert("/page/{page:[0-9]+}", "page").unwrap();
        tree.insert("/src/{file:*}", "src").unwrap();

        let dump = format!("{tree:?}");
        assert!(dump.contains("{page:[0-9]+} => \"page\" [\"page\"]"));
        assert!(dump.contains("{file:*} => \"src\" [\"file\"]"));
    }
}
