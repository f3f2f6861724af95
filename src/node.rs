//! Node graph for the skew queue
//!
//! Every element lives in its own heap-allocated [`Node`] with two child
//! links. A link exclusively owns the subtree behind it, so the graph is
//! always a tree and every node is reachable from exactly one parent (or is
//! the root, owned by the queue).
//!
//! Nodes are created with [`Node::alloc`] and released by [`Node::free`] or
//! [`teardown`]. Copies are made by [`clone_tree`]. Neither walk recurses on
//! the call stack: the right spine of a skew heap is short on average, but
//! the tree as a whole may be a chain as deep as it is long.

use std::ptr::NonNull;

use tracing::trace;

/// Owning link to a subtree; `None` is the empty tree
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a detached single-node tree
    pub(crate) fn alloc(value: T) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node {
            value,
            left: None,
            right: None,
        })))
    }

    /// Frees a single node and hands back its value
    ///
    /// # Safety
    /// `node` must come from [`Node::alloc`], must not be reachable from any
    /// other link, and must have both child links cleared (or the caller must
    /// already own the children through another path).
    pub(crate) unsafe fn free(node: NonNull<Node<T>>) -> T {
        let Node { value, left, right } = *Box::from_raw(node.as_ptr());
        debug_assert!(left.is_none() && right.is_none());
        value
    }
}

/// Frees every node of the tree behind `root` and returns how many were freed
///
/// Uses an explicit work-list instead of recursion. If dropping an element
/// panics, the remaining nodes are still freed while the panic unwinds.
///
/// # Safety
/// `root` must exclusively own its tree; no other live link may point into it.
pub(crate) unsafe fn teardown<T>(root: Link<T>) -> usize {
    let Some(root) = root else {
        return 0;
    };
    let mut work = WorkList {
        pending: vec![root],
        freed: 0,
    };
    work.drain();
    trace!(freed = work.freed, "tore down node graph");
    work.freed
}

struct WorkList<T> {
    pending: Vec<NonNull<Node<T>>>,
    freed: usize,
}

impl<T> WorkList<T> {
    fn drain(&mut self) {
        while let Some(node) = self.pending.pop() {
            // SAFETY: every pointer on the work-list is owned by the list alone;
            // its children are moved onto the list before the node is dropped.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            self.pending.extend(node.left);
            self.pending.extend(node.right);
            self.freed += 1;
            drop(node);
        }
    }
}

impl<T> Drop for WorkList<T> {
    fn drop(&mut self) {
        self.drain();
    }
}

/// Deep-copies the tree behind `root`, one new node per source node
///
/// The copy is grown top-down with an explicit work-list, and each new node
/// is linked into the partial copy as soon as it exists. If `T::clone`
/// panics, the partial copy is torn down before the panic propagates.
///
/// # Safety
/// `root` must point to a valid tree that is not mutated during the call.
pub(crate) unsafe fn clone_tree<T: Clone>(root: Link<T>) -> Link<T> {
    let src_root = root?;
    let mut partial = PartialClone {
        root: Some(Node::alloc((*src_root.as_ptr()).value.clone())),
    };
    let mut pending = Vec::new();
    if let Some(copy_root) = partial.root {
        pending.push((src_root, copy_root));
    }

    while let Some((src, dst)) = pending.pop() {
        let src = &*src.as_ptr();
        if let Some(child) = src.left {
            let copy = Node::alloc((*child.as_ptr()).value.clone());
            (*dst.as_ptr()).left = Some(copy);
            pending.push((child, copy));
        }
        if let Some(child) = src.right {
            let copy = Node::alloc((*child.as_ptr()).value.clone());
            (*dst.as_ptr()).right = Some(copy);
            pending.push((child, copy));
        }
    }

    partial.root.take()
}

/// Owns a copy under construction until [`clone_tree`] hands it out
struct PartialClone<T> {
    root: Link<T>,
}

impl<T> Drop for PartialClone<T> {
    fn drop(&mut self) {
        // SAFETY: the partial copy is only reachable from `self.root`.
        unsafe {
            teardown(self.root.take());
        }
    }
}

/// Counts the nodes of a tree and checks heap order between every parent
/// and child using `is_below(parent, child)`
///
/// Returns `None` if some child is ordered above its parent.
///
/// # Safety
/// `root` must point to a valid tree.
pub(crate) unsafe fn count_ordered<T>(
    root: Link<T>,
    mut is_below: impl FnMut(&T, &T) -> bool,
) -> Option<usize> {
    let mut pending: Vec<NonNull<Node<T>>> = root.into_iter().collect();
    let mut count = 0;
    while let Some(node) = pending.pop() {
        let node = &*node.as_ptr();
        count += 1;
        for child in [node.left, node.right].into_iter().flatten() {
            if is_below(&node.value, &(*child.as_ptr()).value) {
                return None;
            }
            pending.push(child);
        }
    }
    Some(count)
}
