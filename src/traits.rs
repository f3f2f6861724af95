//! Ordering capability and error types for the queue
//!
//! The queue never calls `Ord` directly. Every comparison goes through the
//! [`Compare`] trait, which is allowed to fail:
//!
//! - [`Less`]: natural `Ord` order, largest element on top (infallible)
//! - [`Greater`]: reversed `Ord` order, smallest element on top (infallible)
//! - [`CompareFn`]: adapts a caller closure returning `Result<bool, E>`
//!
//! A failing comparison surfaces as [`QueueError::Comparison`], and the queue
//! is left exactly as it was before the call that hit it.

use std::convert::Infallible;
use std::fmt;

use thiserror::Error;

/// Error type for queue operations
///
/// `E` is the comparator's own error type ([`Compare::Error`]).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError<E> {
    /// `top` or `pop` was called on an empty queue
    #[error("priority queue is empty")]
    Empty,
    /// The ordering comparison failed while merging; nothing was changed
    #[error("ordering comparison failed")]
    Comparison(#[source] E),
}

impl<E> QueueError<E> {
    /// Returns the comparator error, if this is one
    pub fn into_comparison(self) -> Option<E> {
        match self {
            QueueError::Empty => None,
            QueueError::Comparison(e) => Some(e),
        }
    }

    /// Returns true if this is [`QueueError::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueueError::Empty)
    }
}

/// A fallible strict ordering over `T`
///
/// `less(a, b)` answers "is `a` ordered strictly below `b`". The queue keeps
/// the element that nothing is ordered above at its root, so with [`Less`]
/// it behaves as a max-queue.
///
/// Implementations should describe a strict weak ordering. If they do not,
/// the order in which elements come out is unspecified, but the queue stays
/// structurally valid and never leaks.
///
/// # Example
///
/// ```rust
/// use skew_queue::{Compare, Less};
///
/// assert_eq!(Less.less(&1, &2), Ok(true));
/// assert_eq!(Less.less(&2, &2), Ok(false));
/// ```
pub trait Compare<T: ?Sized> {
    /// The error a comparison may produce
    type Error;

    /// Returns whether `a` is ordered strictly below `b`
    fn less(&self, a: &T, b: &T) -> Result<bool, Self::Error>;
}

impl<T: ?Sized, C: Compare<T> + ?Sized> Compare<T> for &C {
    type Error = C::Error;

    fn less(&self, a: &T, b: &T) -> Result<bool, Self::Error> {
        (**self).less(a, b)
    }
}

/// Natural ordering: the largest element is on top
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Less;

impl<T: Ord + ?Sized> Compare<T> for Less {
    type Error = Infallible;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, Infallible> {
        Ok(a < b)
    }
}

/// Reversed ordering: the smallest element is on top
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Greater;

impl<T: Ord + ?Sized> Compare<T> for Greater {
    type Error = Infallible;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, Infallible> {
        Ok(a > b)
    }
}

/// Adapts a closure `Fn(&T, &T) -> Result<bool, E>` into a [`Compare`]
///
/// # Example
///
/// ```rust
/// use skew_queue::{from_fn, SkewQueue};
///
/// let by_len = from_fn(|a: &String, b: &String| -> Result<bool, std::fmt::Error> {
///     Ok(a.len() < b.len())
/// });
/// let mut queue = SkewQueue::with_comparator(by_len);
/// queue.push("ab".to_string()).unwrap();
/// queue.push("abcd".to_string()).unwrap();
/// assert_eq!(queue.peek().map(String::as_str), Some("abcd"));
/// ```
#[derive(Clone, Copy)]
pub struct CompareFn<F>(pub F);

impl<F> fmt::Debug for CompareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareFn").finish_non_exhaustive()
    }
}

impl<T: ?Sized, E, F> Compare<T> for CompareFn<F>
where
    F: Fn(&T, &T) -> Result<bool, E>,
{
    type Error = E;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, E> {
        (self.0)(a, b)
    }
}

/// Wraps a closure as a [`CompareFn`]
pub fn from_fn<T: ?Sized, E, F>(f: F) -> CompareFn<F>
where
    F: Fn(&T, &T) -> Result<bool, E>,
{
    CompareFn(f)
}
