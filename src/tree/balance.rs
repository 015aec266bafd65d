//! Rotations and rebalancing. Nothing here compares keys: nodes are
//! identified by address, so rotations work on any shape of tree.

use super::AvlTree;
use crate::node::{Link, NodePtr};

impl<K, V> AvlTree<K, V> {
    /// Puts `new` in the slot below `parent` that held `old` (or at the root),
    /// and points the parent link of `new` at `parent`.
    pub(super) fn replace_child(
        &mut self,
        parent: Option<NodePtr<K, V>>,
        old: NodePtr<K, V>,
        new: Link<K, V>,
    ) {
        new.set_parent(parent);
        match parent {
            None => self.root = new,
            Some(mut parent_ptr) => unsafe {
                if parent_ptr.as_ref().left == Link::Real(old) {
                    parent_ptr.as_mut().left = new;
                } else {
                    parent_ptr.as_mut().right = new;
                }
            },
        }
    }

    /// Rotates left around `node_ptr` and returns the new local root.
    /// Without a real right child this is a no-op returning `node_ptr`.
    pub(super) fn rotate_left(&mut self, mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let Link::Real(mut right_ptr) = node_ptr.as_ref().right else {
                return node_ptr;
            };

            let right_left = right_ptr.as_ref().left;
            node_ptr.as_mut().right = right_left;
            right_left.set_parent(Some(node_ptr));

            self.replace_child(node_ptr.as_ref().parent, node_ptr, Link::Real(right_ptr));

            right_ptr.as_mut().left = Link::Real(node_ptr);
            node_ptr.as_mut().parent = Some(right_ptr);

            node_ptr.as_mut().adjust_height();
            right_ptr.as_mut().adjust_height();
            right_ptr
        }
    }

    /// Rotates right around `node_ptr` and returns the new local root.
    /// Without a real left child this is a no-op returning `node_ptr`.
    pub(super) fn rotate_right(&mut self, mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let Link::Real(mut left_ptr) = node_ptr.as_ref().left else {
                return node_ptr;
            };

            let left_right = left_ptr.as_ref().right;
            node_ptr.as_mut().left = left_right;
            left_right.set_parent(Some(node_ptr));

            self.replace_child(node_ptr.as_ref().parent, node_ptr, Link::Real(left_ptr));

            left_ptr.as_mut().right = Link::Real(node_ptr);
            node_ptr.as_mut().parent = Some(left_ptr);

            node_ptr.as_mut().adjust_height();
            left_ptr.as_mut().adjust_height();
            left_ptr
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Child heights must be correct and the balance factor within +2 and -2.
    /// Returns the root of the (possibly rotated) sub tree.
    pub(super) fn rebalance_node(&mut self, mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let balance = node_ptr.as_ref().balance();
            debug_assert!(balance.abs() <= 2);
            if balance > 1 {
                // Left heavy, rotate left child first if it leans the other way
                if let Link::Real(left_ptr) = node_ptr.as_ref().left {
                    if left_ptr.as_ref().balance() < 0 {
                        self.rotate_left(left_ptr);
                    }
                }
                self.rotate_right(node_ptr)
            } else if balance < -1 {
                // Right heavy
                if let Link::Real(right_ptr) = node_ptr.as_ref().right {
                    if right_ptr.as_ref().balance() > 0 {
                        self.rotate_right(right_ptr);
                    }
                }
                self.rotate_left(node_ptr)
            } else {
                node_ptr.as_mut().adjust_height();
                node_ptr
            }
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    /// Restores the AVL condition after any change that grew or shrank one
    /// sub tree by at most one level relative to its sibling.
    pub(super) fn rebalance_path(&mut self, start_from: Option<NodePtr<K, V>>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
        debug_assert!(self
            .root
            .real()
            .map_or(true, |root_ptr| unsafe { root_ptr.as_ref().parent.is_none() }));
    }

    /// Walks up from the parent of a freshly linked leaf, adjusting heights.
    ///
    /// Stops at the first node that needs a rotation (one rebalance restores
    /// the whole tree after a single insert), at the first node whose height
    /// did not change, or at the root. Returns the number of promotions:
    /// nodes whose height grew without a rotation.
    pub(super) fn rebalance_after_insert(&mut self, start_from: NodePtr<K, V>) -> usize {
        let mut promotions = 0;
        let mut node_ptr = start_from;
        loop {
            let (height_before, height_after, balance) = unsafe {
                let node = node_ptr.as_mut();
                let height_before = node.height;
                node.adjust_height();
                (height_before, node.height, node.balance())
            };
            if balance.abs() > 1 {
                self.rebalance_node(node_ptr);
                break;
            }
            if height_after == height_before {
                break;
            }
            promotions += 1;
            match unsafe { node_ptr.as_ref().parent } {
                Some(parent_ptr) => node_ptr = parent_ptr,
                None => break,
            }
        }
        promotions
    }
}
