//! Handler chains and the cursor that walks them.
//!
//! A request runs through an ordered chain of handlers. The [`Cursor`] tracks
//! the position in that chain:
//!
//! ```text
//!  index   -1        0 .. len-1         len
//!          start     running handler    exhausted / aborted
//! ```
//!
//! Advancing past the last handler, or aborting, parks the cursor at `len`,
//! after which every further advance is a no-op.
use crate::handler::BoxedHandler;

use std::fmt;
use std::sync::Arc;

/// An immutable, shareable snapshot of handlers.
#[derive(Clone)]
pub struct Chain {
    handlers: Arc<[BoxedHandler]>,
}

impl Chain {
    /// Creates a chain from handlers in invocation order.
    pub fn new(handlers: Vec<BoxedHandler>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    /// The number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the handler at `index`.
    pub fn get(&self, index: usize) -> Option<&BoxedHandler> {
        self.handlers.get(index)
    }
}

impl From<Vec<BoxedHandler>> for Chain {
    fn from(handlers: Vec<BoxedHandler>) -> Self {
        Chain::new(handlers)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.len()).finish()
    }
}

/// Position of a request in its handler chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    index: isize,
    len: isize,
}

impl Cursor {
    /// A cursor positioned before the first of `len` handlers.
    pub fn new(len: usize) -> Self {
        Self {
            index: -1,
            len: isize::try_from(len).unwrap_or(isize::MAX),
        }
    }

    /// Rewinds the cursor for a chain of `len` handlers.
    pub fn reset(&mut self, len: usize) {
        *self = Cursor::new(len);
    }

    /// Moves to the next handler and returns its position, or `None` once the
    /// chain is exhausted or aborted.
    pub fn advance(&mut self) -> Option<usize> {
        if self.index >= self.len {
            return None;
        }

        self.index += 1;
        if self.index < self.len {
            usize::try_from(self.index).ok()
        } else {
            None
        }
    }

    /// Skips every handler that has not started yet.
    pub fn abort(&mut self) {
        self.index = self.len;
    }

    /// Returns `true` once the cursor is parked at the end of the chain.
    pub fn is_aborted(&self) -> bool {
        self.index == self.len
    }

    /// The current position, `-1` before the first handler has started.
    pub fn index(&self) -> isize {
        self.index
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::new(0)
    }
}
