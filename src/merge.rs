//! Skew-heap merge with per-frame rollback
//!
//! [`merge_nodes`] is the one structural operation of the queue: `push`
//! merges a single-node tree into the root, `pop` merges the root's two
//! children, and `merge` joins two whole trees.
//!
//! # Algorithm
//!
//! Given two non-empty trees, the root that is not ordered below the other
//! stays on top (ties keep the first argument). Its right subtree is merged
//! with the other tree, and the top node's children are swapped so the
//! merged subtree ends up on the left. Swapping on every step keeps right
//! spines short without storing any balance information, which gives
//! O(log n) amortized merges.
//!
//! # Rollback
//!
//! Each frame re-links its top node *before* recursing, so a comparison
//! that fails deeper down finds the outer frames already modified. Every
//! frame therefore holds a [`RollbackGuard`] with the top node's original
//! links. The guard is committed once the frame's sub-merge has succeeded;
//! if the frame is left early instead (an `Err` returned through `?`, or a
//! panic unwinding out of the comparator), the guard puts the links back.
//! Guards drop innermost first, so the whole merge is undone in reverse
//! order and both inputs come back exactly as they were.

use std::mem;
use std::ptr::NonNull;

use crate::node::{Link, Node};
use crate::traits::Compare;

/// Snapshot of one node's child links, restored on drop unless committed
///
/// Guards restore structure only. A node allocated by the failing operation
/// is never linked into a surviving tree and must be freed by whoever
/// allocated it.
pub(crate) struct RollbackGuard<T> {
    node: NonNull<Node<T>>,
    left: Link<T>,
    right: Link<T>,
    active: bool,
}

impl<T> RollbackGuard<T> {
    /// Records `node`'s current children
    ///
    /// # Safety
    /// `node` must stay allocated for as long as the guard lives.
    pub(crate) unsafe fn new(node: NonNull<Node<T>>) -> Self {
        let current = &*node.as_ptr();
        RollbackGuard {
            node,
            left: current.left,
            right: current.right,
            active: true,
        }
    }

    /// Keeps the node's new links
    pub(crate) fn commit(mut self) {
        self.active = false;
    }
}

impl<T> Drop for RollbackGuard<T> {
    fn drop(&mut self) {
        if self.active {
            // SAFETY: nodes are never freed while a merge that guards them
            // is still on the stack.
            unsafe {
                let node = &mut *self.node.as_ptr();
                node.left = self.left;
                node.right = self.right;
            }
        }
    }
}

/// Merges two trees and returns the new root
///
/// If either tree is empty the other is returned untouched, without calling
/// the comparator. On `Err` (or a panic from the comparator) both input
/// trees are left exactly as they were passed in.
///
/// # Safety
/// `a` and `b` must each exclusively own a valid tree, and the two trees must
/// be disjoint. On success the returned link owns every node of both; on
/// failure ownership stays with `a` and `b`.
pub(crate) unsafe fn merge_nodes<T, C>(cmp: &C, a: Link<T>, b: Link<T>) -> Result<Link<T>, C::Error>
where
    C: Compare<T> + ?Sized,
{
    let (mut top, mut other) = match (a, b) {
        (None, rest) | (rest, None) => return Ok(rest),
        (Some(a), Some(b)) => (a, b),
    };

    if cmp.less(&(*top.as_ptr()).value, &(*other.as_ptr()).value)? {
        mem::swap(&mut top, &mut other);
    }

    let guard = RollbackGuard::new(top);
    let node = top.as_ptr();
    let right = (*node).right.take();
    (*node).right = (*node).left.take();
    (*node).left = merge_nodes(cmp, right, Some(other))?;
    guard.commit();

    Ok(Some(top))
}
