use std::fmt;
use std::marker::PhantomData;

use crate::node::{Link, Node, NodePtr};
use crate::tree::AvlTree;

/// An iterator over the key-value pairs of a tree in ascending key order.
///
/// Walks parent links, so it needs no stack; each step is amortized
/// constant time.
pub struct Iter<'a, K, V> {
    front: Option<NodePtr<K, V>>,
    back: Option<NodePtr<K, V>>,
    marker: PhantomData<&'a Node<K, V>>,
}

/// An owning iterator over the key-value pairs of a tree in ascending key order.
pub struct IntoIter<K, V> {
    tree: AvlTree<K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(front: Option<NodePtr<K, V>>, back: Option<NodePtr<K, V>>) -> Self {
        Self {
            front,
            back,
            marker: PhantomData,
        }
    }

    fn successor(node_ptr: NodePtr<K, V>) -> Option<NodePtr<K, V>> {
        unsafe {
            if let Link::Real(mut next_ptr) = node_ptr.as_ref().right {
                while let Link::Real(left_ptr) = next_ptr.as_ref().left {
                    next_ptr = left_ptr;
                }
                return Some(next_ptr);
            }
            let mut child_ptr = node_ptr;
            while let Some(parent_ptr) = child_ptr.as_ref().parent {
                if parent_ptr.as_ref().left == Link::Real(child_ptr) {
                    return Some(parent_ptr);
                }
                child_ptr = parent_ptr;
            }
            None
        }
    }

    fn predecessor(node_ptr: NodePtr<K, V>) -> Option<NodePtr<K, V>> {
        unsafe {
            if let Link::Real(mut prev_ptr) = node_ptr.as_ref().left {
                while let Link::Real(right_ptr) = prev_ptr.as_ref().right {
                    prev_ptr = right_ptr;
                }
                return Some(prev_ptr);
            }
            let mut child_ptr = node_ptr;
            while let Some(parent_ptr) = child_ptr.as_ref().parent {
                if parent_ptr.as_ref().right == Link::Real(child_ptr) {
                    return Some(parent_ptr);
                }
                child_ptr = parent_ptr;
            }
            None
        }
    }

    /// Hands out a pair and closes the range if both ends met.
    fn yield_node(&mut self, node_ptr: NodePtr<K, V>) -> (&'a K, &'a V) {
        if self.front == self.back {
            self.front = None;
            self.back = None;
        }
        let node = unsafe { &*node_ptr.as_ptr() };
        (&node.key, &node.value)
    }
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tree: AvlTree<K, V>) -> Self {
        Self { tree }
    }
}

// Auto derived clone would require K: Clone and V: Clone
impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.front?;
        let item = self.yield_node(node_ptr);
        if self.front.is_some() {
            self.front = Self::successor(node_ptr);
        }
        Some(item)
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node_ptr = self.back?;
        let item = self.yield_node(node_ptr);
        if self.back.is_some() {
            self.back = Self::predecessor(node_ptr);
        }
        Some(item)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.tree.iter()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.tree.pop_min_unbalanced()
    }
}
