//! Joining two trees around a middle key, and splitting a tree at a node.

use std::borrow::Borrow;
use std::cell::Cell;
use std::marker::PhantomData;
use std::mem;

use super::AvlTree;
use crate::error::AvlError;
use crate::node::{Link, Node, NodeHandle, NodePtr};

impl<K: Ord, V> AvlTree<K, V> {
    /// Joins `other` and a middle key-value pair into `self`.
    ///
    /// One of the two trees must hold only keys smaller than `key` and the
    /// other only keys larger than `key`; either tree may be the smaller one
    /// and either may be empty. Runs in time proportional to the difference
    /// of the two tree heights.
    ///
    /// # Panics
    ///
    /// Panics if `key` does not separate the keys of the two trees.
    pub fn join(&mut self, other: Self, key: K, value: V) {
        let self_is_lower = self.is_lower_side(&other, &key);
        let mid_ptr = Node::create(key, value);
        self.join_node(other, mid_ptr, self_is_lower);
    }

    /// Splits the tree at a node into the trees of smaller and of larger keys.
    ///
    /// The node itself is dropped. Every ancestor of the node is joined into
    /// one side together with the sub tree hanging off its other side, for a
    /// total of O(log² n) work. The returned trees count their nodes lazily,
    /// on the first call to [`len`](AvlTree::len).
    ///
    /// # Safety
    ///
    /// `node` must be a handle to a node currently stored in this tree.
    pub unsafe fn split(mut self, node: NodeHandle<K, V>) -> (Self, Self) {
        let node_ptr = node.ptr;
        let mut smaller = Self::from_subtree(node_ptr.as_ref().left);
        let mut larger = Self::from_subtree(node_ptr.as_ref().right);

        let mut child_ptr = node_ptr;
        let mut parent = node_ptr.as_ref().parent;
        while let Some(mut parent_ptr) = parent {
            parent = parent_ptr.as_ref().parent;
            if parent_ptr.as_ref().left == Link::Real(child_ptr) {
                // Parent and its right sub tree hold the next larger keys
                let piece = Self::from_subtree(parent_ptr.as_ref().right);
                parent_ptr.as_mut().reset();
                larger.join_node(piece, parent_ptr, true);
            } else {
                // Parent and its left sub tree hold the next smaller keys
                let piece = Self::from_subtree(parent_ptr.as_ref().left);
                parent_ptr.as_mut().reset();
                smaller.join_node(piece, parent_ptr, false);
            }
            child_ptr = parent_ptr;
        }

        // Every node now belongs to one of the two sides
        self.root = Link::Sentinel;
        self.min = None;
        self.max = None;
        self.num_nodes.set(Some(0));
        Node::destroy(node_ptr);

        (smaller, larger)
    }

    /// Splits the tree at the node holding `key`, leaving `self` empty.
    ///
    /// Fails with [`AvlError::KeyNotFound`] if the key is absent, in which
    /// case `self` is left unchanged.
    pub fn split_at<Q>(&mut self, key: &Q) -> Result<(Self, Self), AvlError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_ptr = self.find(key).ok_or(AvlError::KeyNotFound)?;
        let tree = mem::take(self);
        // SAFETY: the node was just found in this tree
        Ok(unsafe { tree.split(NodeHandle { ptr: node_ptr }) })
    }

    /// Returns whether `self` holds the keys below `key` and `other` those
    /// above it. Two empty trees count as lower.
    fn is_lower_side(&self, other: &Self, key: &K) -> bool {
        if Self::separates(self, other, key) {
            true
        } else if Self::separates(other, self, key) {
            false
        } else {
            panic!("join key must separate the keys of both trees");
        }
    }

    fn separates(lower: &Self, upper: &Self, key: &K) -> bool {
        let below = lower
            .max
            .map_or(true, |max_ptr| unsafe { max_ptr.as_ref() }.key < *key);
        let above = upper
            .min
            .map_or(true, |min_ptr| unsafe { min_ptr.as_ref() }.key > *key);
        below && above
    }

    /// Joins `other` into `self` around a detached leaf node.
    fn join_node(&mut self, mut other: Self, mut mid_ptr: NodePtr<K, V>, self_is_lower: bool) {
        debug_assert!({
            let key = unsafe { &mid_ptr.as_ref().key };
            if self_is_lower {
                Self::separates(self, &other, key)
            } else {
                Self::separates(&other, self, key)
            }
        });
        let num_nodes = match (self.num_nodes.get(), other.num_nodes.get()) {
            (Some(self_len), Some(other_len)) => Some(self_len + other_len + 1),
            _ => None,
        };

        let (lower, upper) = if self_is_lower {
            (&mut *self, &mut other)
        } else {
            (&mut other, &mut *self)
        };
        let min = lower.min.or(Some(mid_ptr));
        let max = upper.max.or(Some(mid_ptr));
        let lower_root = mem::replace(&mut lower.root, Link::Sentinel);
        let upper_root = mem::replace(&mut upper.root, Link::Sentinel);

        // Descend the taller tree along the side facing the shorter one until
        // reaching a sub tree no taller than the shorter tree
        let (tall, short, descend_right) = if lower_root.height() >= upper_root.height() {
            (lower_root, upper_root, true)
        } else {
            (upper_root, lower_root, false)
        };
        self.root = tall;
        let short_height = short.height();
        let mut parent: Option<NodePtr<K, V>> = None;
        let mut current = tall;
        while current.height() > short_height {
            let Link::Real(node_ptr) = current else {
                break;
            };
            parent = Some(node_ptr);
            current = unsafe {
                if descend_right {
                    node_ptr.as_ref().right
                } else {
                    node_ptr.as_ref().left
                }
            };
        }

        // The middle node adopts the matched sub tree and the shorter tree
        unsafe {
            let mid = mid_ptr.as_mut();
            if descend_right {
                mid.left = current;
                mid.right = short;
            } else {
                mid.left = short;
                mid.right = current;
            }
            mid.adjust_height();
            mid.parent = parent;
        }
        current.set_parent(Some(mid_ptr));
        short.set_parent(Some(mid_ptr));

        // Hang the middle node where the matched sub tree was
        match parent {
            None => self.root = Link::Real(mid_ptr),
            Some(mut parent_ptr) => unsafe {
                if descend_right {
                    parent_ptr.as_mut().right = Link::Real(mid_ptr);
                } else {
                    parent_ptr.as_mut().left = Link::Real(mid_ptr);
                }
            },
        }
        self.rebalance_path(Some(mid_ptr));

        self.min = min;
        self.max = max;
        self.num_nodes.set(num_nodes);
        // `other` is left empty and drops without touching any node
        other.min = None;
        other.max = None;
    }

    /// Wraps a detached sub tree into a tree of its own.
    fn from_subtree(root: Link<K, V>) -> Self {
        root.set_parent(None);
        Self {
            root,
            min: Self::leftmost(root),
            max: Self::rightmost(root),
            num_nodes: Cell::new(if root.is_real() { None } else { Some(0) }),
            marker: PhantomData,
        }
    }
}
