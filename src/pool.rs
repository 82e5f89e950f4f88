//! A bounded pool of reusable values.
use parking_lot::Mutex;

use std::fmt;
use std::ops::{Deref, DerefMut};

/// The default number of idle values a pool retains.
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// A pool of reusable values.
///
/// [`acquire`](Pool::acquire) hands out an idle value, creating a new one when
/// the pool is empty. The returned guard puts the value back when it is
/// dropped, on every exit path. At most `max_idle` values are retained, any
/// others are dropped on release.
///
/// Values come back exactly as they were left, callers reset them after
/// acquiring.
///
/// ```
/// use trellis::Pool;
///
/// let pool = Pool::new(Vec::<u8>::new);
/// {
///     let mut buf = pool.acquire();
///     buf.extend_from_slice(b"hello");
/// }
/// assert_eq!(pool.idle(), 1);
/// ```
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
    create: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Pool<T> {
    /// Creates a pool that retains up to [`DEFAULT_MAX_IDLE`] values.
    pub fn new(create: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Pool::with_capacity(DEFAULT_MAX_IDLE, create)
    }

    /// Creates a pool that retains up to `max_idle` values.
    pub fn with_capacity(max_idle: usize, create: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            create: Box::new(create),
        }
    }

    /// Takes a value out of the pool.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let value = self.idle.lock().pop().unwrap_or_else(|| (self.create)());
        Pooled {
            pool: self,
            value: Some(value),
        }
    }

    fn release(&self, value: T) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(value);
        }
    }

    /// The number of values currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// The maximum number of idle values retained.
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// A value borrowed from a [`Pool`], returned to it on drop.
pub struct Pooled<'p, T> {
    pool: &'p Pool<T>,
    // `None` only once dropped
    value: Option<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("pooled value taken before drop")
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("pooled value taken before drop")
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}
