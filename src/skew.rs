//! Skew Heap priority queue
//!
//! A skew heap is a heap-ordered binary tree that is restructured only by
//! merging. Every mutation is one call to the merge engine:
//!
//! | Operation | Merge performed                     | Complexity         |
//! |-----------|-------------------------------------|--------------------|
//! | `push`    | root with a new single-node tree    | O(log n) amortized |
//! | `pop`     | the root's left and right children  | O(log n) amortized |
//! | `merge`   | this root with the other queue's    | O(log n) amortized |
//! | `top`     | none                                | O(1)               |
//!
//! # Failure safety
//!
//! The ordering is supplied by the caller through [`Compare`] and may fail.
//! When it does, `push`, `pop` and `merge` return
//! [`QueueError::Comparison`] and every queue involved is left exactly as it
//! was: same elements, same length, same pop order. A comparator that panics
//! gets the same treatment while the panic unwinds. Calling the operation
//! again once the comparator stops failing gives the same result as if the
//! failed call had never happened.
//!
//! # Example
//!
//! ```rust
//! use skew_queue::SkewQueue;
//!
//! let mut queue = SkewQueue::new();
//! for v in [5, 3, 8, 1] {
//!     queue.push(v).unwrap();
//! }
//! assert_eq!(queue.top(), Ok(&8));
//! assert_eq!(queue.pop(), Ok(8));
//! assert_eq!(queue.top(), Ok(&5));
//!
//! let mut other = SkewQueue::new();
//! other.push(10).unwrap();
//! other.push(2).unwrap();
//! queue.merge(&mut other).unwrap();
//! assert_eq!(queue.top(), Ok(&10));
//! assert_eq!(queue.len(), 5);
//! assert!(other.is_empty());
//! ```

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use tracing::debug;

use crate::merge::merge_nodes;
use crate::node::{clone_tree, count_ordered, teardown, Link, Node};
use crate::traits::{Compare, Less, QueueError};

/// A mergeable max-priority queue backed by a skew heap
///
/// The element on top is the one nothing else is ordered above according
/// to `C`. With the default [`Less`] ordering that is the largest element;
/// use [`Greater`](crate::Greater) for a min-queue, or
/// [`from_fn`](crate::from_fn) for a fallible caller-defined ordering.
pub struct SkewQueue<T, C = Less> {
    root: Link<T>,
    len: usize,
    cmp: C,
    _marker: PhantomData<Box<Node<T>>>,
}

// SAFETY: the queue exclusively owns every node reachable from `root`, the
// same way a tree of `Box`es would.
unsafe impl<T: Send, C: Send> Send for SkewQueue<T, C> {}
unsafe impl<T: Sync, C: Sync> Sync for SkewQueue<T, C> {}

impl<T> SkewQueue<T, Less> {
    /// Creates an empty queue ordered by `T`'s `Ord`, largest on top
    pub fn new() -> Self {
        Self::with_comparator(Less)
    }
}

impl<T, C> SkewQueue<T, C> {
    /// Creates an empty queue that orders elements with `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        SkewQueue {
            root: None,
            len: 0,
            cmp,
            _marker: PhantomData,
        }
    }

    /// Returns the comparator this queue orders by
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of elements in the queue
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the queue holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the top element, or `None` if the queue is empty
    pub fn peek(&self) -> Option<&T> {
        // SAFETY: the root is owned by `self` and outlives the borrow.
        self.root.map(|root| unsafe { &(*root.as_ptr()).value })
    }

    /// Removes every element
    pub fn clear(&mut self) {
        self.len = 0;
        // SAFETY: the tree is detached from `self` before it is freed.
        unsafe {
            teardown(self.root.take());
        }
    }
}

impl<T, C: Compare<T>> SkewQueue<T, C> {
    /// Returns the top element
    ///
    /// # Errors
    /// [`QueueError::Empty`] if the queue is empty.
    pub fn top(&self) -> Result<&T, QueueError<C::Error>> {
        self.peek().ok_or(QueueError::Empty)
    }

    /// Inserts an element
    ///
    /// # Errors
    /// [`QueueError::Comparison`] if the comparator fails. The element is
    /// dropped and the queue is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), QueueError<C::Error>> {
        let pending = PendingNode::new(value);
        // SAFETY: the root and the new node are disjoint trees owned here.
        match unsafe { merge_nodes(&self.cmp, self.root, Some(pending.node)) } {
            Ok(root) => {
                pending.commit();
                self.root = root;
                self.len += 1;
                Ok(())
            }
            Err(e) => {
                debug!(len = self.len, "push rolled back after comparison failure");
                Err(QueueError::Comparison(e))
            }
        }
    }

    /// Removes and returns the top element
    ///
    /// # Errors
    /// [`QueueError::Empty`] if the queue is empty, or
    /// [`QueueError::Comparison`] if the comparator fails while the root's
    /// children are merged. On failure nothing is removed.
    pub fn pop(&mut self) -> Result<T, QueueError<C::Error>> {
        let root = self.root.ok_or(QueueError::Empty)?;
        // SAFETY: the root's two subtrees are disjoint and owned by `self`.
        // The root keeps pointing at them until the merge has succeeded, so
        // a failed merge leaves the queue as it was.
        unsafe {
            let (left, right) = {
                let node = &*root.as_ptr();
                (node.left, node.right)
            };
            match merge_nodes(&self.cmp, left, right) {
                Ok(new_root) => {
                    let node = &mut *root.as_ptr();
                    node.left = None;
                    node.right = None;
                    self.root = new_root;
                    self.len -= 1;
                    Ok(Node::free(root))
                }
                Err(e) => {
                    debug!(len = self.len, "pop rolled back after comparison failure");
                    Err(QueueError::Comparison(e))
                }
            }
        }
    }

    /// Moves every element of `other` into this queue, leaving `other` empty
    ///
    /// Elements are ordered with this queue's comparator. Merging a queue
    /// into itself cannot be expressed: the two `&mut` borrows would alias.
    ///
    /// ```compile_fail,E0499
    /// use skew_queue::SkewQueue;
    ///
    /// let mut queue: SkewQueue<i32> = SkewQueue::new();
    /// queue.merge(&mut queue).unwrap();
    /// ```
    ///
    /// # Errors
    /// [`QueueError::Comparison`] if the comparator fails. Both queues keep
    /// exactly the elements they had.
    pub fn merge(&mut self, other: &mut Self) -> Result<(), QueueError<C::Error>> {
        if other.root.is_none() {
            return Ok(());
        }
        // SAFETY: two distinct queues never share nodes.
        match unsafe { merge_nodes(&self.cmp, self.root, other.root) } {
            Ok(root) => {
                self.root = root;
                other.root = None;
                self.len += mem::take(&mut other.len);
                Ok(())
            }
            Err(e) => {
                debug!(
                    len = self.len,
                    other_len = other.len,
                    "merge rolled back after comparison failure"
                );
                Err(QueueError::Comparison(e))
            }
        }
    }

    /// Walks the whole tree and checks that the node count matches `len`
    /// and no child is ordered above its parent
    ///
    /// Runs in O(n) and calls the comparator once per parent-child link. A
    /// comparison that fails during the walk counts as "not ordered above".
    /// Every successful or rolled-back operation leaves this returning `true`.
    ///
    /// ```rust
    /// use skew_queue::{from_fn, SkewQueue};
    ///
    /// let cmp = from_fn(|a: &i32, b: &i32| {
    ///     if *a == 3 || *b == 3 {
    ///         Err(())
    ///     } else {
    ///         Ok(a < b)
    ///     }
    /// });
    /// let mut queue = SkewQueue::with_comparator(&cmp);
    /// queue.push(1).unwrap();
    /// queue.push(2).unwrap();
    /// assert!(queue.push(3).is_err());
    /// assert_eq!(queue.len(), 2);
    /// assert!(queue.verify_structure());
    /// ```
    pub fn verify_structure(&self) -> bool {
        // SAFETY: the tree is owned by `self` and not mutated during the walk.
        let counted = unsafe {
            count_ordered(self.root, |parent, child| {
                matches!(self.cmp.less(parent, child), Ok(true))
            })
        };
        counted == Some(self.len) && self.root.is_none() == (self.len == 0)
    }
}

impl<T, C: Compare<T, Error = Infallible>> SkewQueue<T, C> {
    /// Consumes the queue and returns its elements in pop order, top first
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len);
        while let Ok(value) = self.pop() {
            sorted.push(value);
        }
        sorted
    }
}

impl<T, C> Drop for SkewQueue<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C: Default> Default for SkewQueue<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone, C: Clone> Clone for SkewQueue<T, C> {
    fn clone(&self) -> Self {
        let cmp = self.cmp.clone();
        SkewQueue {
            // SAFETY: the source tree is borrowed immutably for the copy.
            root: unsafe { clone_tree(self.root) },
            len: self.len,
            cmp,
            _marker: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        // Copy first: if an element's clone panics, `self` is untouched.
        let copy = source.clone();
        *self = copy;
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SkewQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkewQueue")
            .field("len", &self.len)
            .field("top", &self.peek())
            .finish_non_exhaustive()
    }
}

impl<T, C: Compare<T, Error = Infallible>> Extend<T> for SkewQueue<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(QueueError::Comparison(never)) = self.push(value) {
                match never {}
            }
        }
    }
}

impl<T, C: Compare<T, Error = Infallible> + Default> FromIterator<T> for SkewQueue<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::default();
        queue.extend(iter);
        queue
    }
}

/// A freshly allocated node that `push` has not linked in yet
///
/// Freed on drop unless committed, which covers both a comparison error and
/// a comparator panic.
struct PendingNode<T> {
    node: NonNull<Node<T>>,
}

impl<T> PendingNode<T> {
    fn new(value: T) -> Self {
        PendingNode {
            node: Node::alloc(value),
        }
    }

    fn commit(self) {
        mem::forget(self);
    }
}

impl<T> Drop for PendingNode<T> {
    fn drop(&mut self) {
        // SAFETY: the merge failed, so the rollback guards have unlinked the
        // node and restored its empty child slots.
        drop(unsafe { Node::free(self.node) });
    }
}
