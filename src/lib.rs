//! Mergeable priority queue on a skew heap
//!
//! This crate provides [`SkewQueue`], a priority queue with O(log n)
//! amortized push, pop and merge, whose ordering is supplied by the caller
//! and is allowed to fail.
//!
//! # Features
//!
//! - **Skew heap**: self-adjusting binary tree, no balance metadata per node
//! - **Fallible comparisons**: orderings implement [`Compare`] and may return
//!   an error; closures plug in through [`from_fn`]
//! - **Rollback**: a failed `push`, `pop` or `merge` leaves every queue
//!   involved exactly as it was, including when the comparator panics
//! - **Deep structures**: cloning and dropping walk the tree with an explicit
//!   work-list, so degenerate trees cannot overflow the stack
//!
//! # Example
//!
//! ```rust
//! use skew_queue::{from_fn, QueueError, SkewQueue};
//!
//! #[derive(Debug, PartialEq)]
//! struct Unordered;
//!
//! let cmp = from_fn(|a: &f64, b: &f64| a.partial_cmp(b).map(|o| o.is_lt()).ok_or(Unordered));
//! let mut queue = SkewQueue::with_comparator(cmp);
//! queue.push(2.5).unwrap();
//! queue.push(7.0).unwrap();
//!
//! assert_eq!(queue.push(f64::NAN), Err(QueueError::Comparison(Unordered)));
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.pop(), Ok(7.0));
//! ```

mod merge;
mod node;
pub mod skew;
pub mod traits;

pub use skew::SkewQueue;
pub use traits::{from_fn, Compare, CompareFn, Greater, Less, QueueError};
