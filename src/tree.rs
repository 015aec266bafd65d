//! An ordered dictionary on an AVL tree.

use std::borrow::Borrow;
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;

use crate::error::AvlError;
use crate::iter::{IntoIter, Iter};
use crate::node::{Link, Node, NodeHandle, NodePtr};

mod balance;
mod join;

/// An ordered dictionary implemented with an AVL tree.
///
/// Besides the usual root-based search and insert, the tree offers finger
/// variants that start at the maximum node, and whole-tree [`join`] and
/// [`split`]. Searches and inserts report how many edges they walked, and
/// inserts how many ancestors were promoted.
///
/// ```
/// use finger_avl::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(10, "ten").unwrap();
/// tree.insert(20, "twenty").unwrap();
/// tree.finger_insert(30, "thirty").unwrap();
/// let (node, edges) = tree.search(&20);
/// assert_eq!(node.map(|node| *node.value()), Some("twenty"));
/// assert_eq!(edges, 1);
/// assert_eq!(tree.max_node().map(|node| *node.key()), Some(30));
/// ```
///
/// [`join`]: AvlTree::join
/// [`split`]: AvlTree::split
pub struct AvlTree<K, V> {
    root: Link<K, V>,
    min: Option<NodePtr<K, V>>,
    max: Option<NodePtr<K, V>>,
    // `None` after a split until the next count
    num_nodes: Cell<Option<usize>>,
    marker: PhantomData<Box<Node<K, V>>>,
}

// SAFETY: the tree uniquely owns all of its nodes.
unsafe impl<K: Send, V: Send> Send for AvlTree<K, V> {}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: Link::Sentinel,
            min: None,
            max: None,
            num_nodes: Cell::new(Some(0)),
            marker: PhantomData,
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        !self.root.is_real()
    }

    /// Returns the number of elements in the tree.
    ///
    /// Trees produced by [`split`](AvlTree::split) count their nodes on the
    /// first call; every other call is constant time.
    pub fn len(&self) -> usize {
        if let Some(num_nodes) = self.num_nodes.get() {
            return num_nodes;
        }
        let mut num_nodes = 0;
        self.traverse(|_| num_nodes += 1, |_| {}, |_| {});
        self.num_nodes.set(Some(num_nodes));
        num_nodes
    }

    /// Returns the height of the tree: 0 for a single node, -1 when empty.
    pub fn height(&self) -> i32 {
        self.root.height()
    }

    /// Returns the root node, `None` if the tree is empty.
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.real().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the node with the smallest key, `None` if the tree is empty.
    pub fn min_node(&self) -> Option<&Node<K, V>> {
        self.min.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the node with the largest key, `None` if the tree is empty.
    pub fn max_node(&self) -> Option<&Node<K, V>> {
        self.max.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe {
            Node::destroy(node_ptr);
        });
        self.root = Link::Sentinel;
        self.min = None;
        self.max = None;
        self.num_nodes.set(Some(0));
    }

    /// Gets a lazy iterator over the key-value pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.min, self.max)
    }

    /// Returns all key-value pairs in ascending key order.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut pairs = Vec::with_capacity(self.num_nodes.get().unwrap_or(0));
        self.traverse(
            |_| {},
            |node_ptr| {
                let node = unsafe { node_ptr.as_ref() };
                pairs.push((node.key.clone(), node.value.clone()));
            },
            |_| {},
        );
        pairs
    }

    /// Detaches the smallest node without rebalancing.
    /// Only valid while the tree is being consumed.
    pub(crate) fn pop_min_unbalanced(&mut self) -> Option<(K, V)> {
        let min_ptr = self.min?;
        unsafe {
            let parent = min_ptr.as_ref().parent;
            let right = min_ptr.as_ref().right;
            self.replace_child(parent, min_ptr, right);
            self.min = match right {
                Link::Real(_) => Self::leftmost(right),
                Link::Sentinel => parent,
            };
            if self.min.is_none() {
                self.max = None;
            }
            self.num_nodes.set(self.num_nodes.get().map(|n| n - 1));
            Some(Node::destroy(min_ptr))
        }
    }

    fn leftmost(link: Link<K, V>) -> Option<NodePtr<K, V>> {
        let mut node_ptr = link.real()?;
        while let Link::Real(left_ptr) = unsafe { node_ptr.as_ref().left } {
            node_ptr = left_ptr;
        }
        Some(node_ptr)
    }

    fn rightmost(link: Link<K, V>) -> Option<NodePtr<K, V>> {
        let mut node_ptr = link.real()?;
        while let Link::Real(right_ptr) = unsafe { node_ptr.as_ref().right } {
            node_ptr = right_ptr;
        }
        Some(node_ptr)
    }

    /// Recomputes the cached extremes by walking both boundaries.
    fn update_bounds(&mut self) {
        self.min = Self::leftmost(self.root);
        self.max = Self::rightmost(self.root);
    }

    fn clone_subtree(link: Link<K, V>, parent: Option<NodePtr<K, V>>) -> Link<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let Link::Real(node_ptr) = link else {
            return Link::Sentinel;
        };
        let node = unsafe { node_ptr.as_ref() };
        let mut copy_ptr = Node::create(node.key.clone(), node.value.clone());
        let left = Self::clone_subtree(node.left, Some(copy_ptr));
        let right = Self::clone_subtree(node.right, Some(copy_ptr));
        unsafe {
            let copy = copy_ptr.as_mut();
            copy.left = left;
            copy.right = right;
            copy.parent = parent;
            copy.height = node.height;
        }
        Link::Real(copy_ptr)
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    fn postorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K, V>),
        In: FnMut(NodePtr<K, V>),
        Post: FnMut(NodePtr<K, V>),
    {
        if let Link::Real(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Link::Real(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_ptr);
                        if let Link::Real(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if unsafe { parent_ptr.as_ref().left } == Link::Real(node_ptr) {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key)
            .map(|node_ptr| &mut unsafe { &mut *node_ptr.as_ptr() }.value)
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Searches for `key` starting at the root.
    ///
    /// On a hit returns the node and the number of edges from the root to
    /// it plus one. On a miss returns `None` and the number of edges from the
    /// root to the sentinel where the search ended, which is also the edge
    /// count an [`insert`](AvlTree::insert) of that key reports.
    pub fn search<Q>(&self, key: &Q) -> (Option<&Node<K, V>>, isize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (found, edges) = Self::descend(self.root, key);
        (
            found.map(|node_ptr| unsafe { &*node_ptr.as_ptr() }),
            edges as isize,
        )
    }

    /// Searches for `key` starting at the maximum node.
    ///
    /// Climbs from the maximum while the current key is larger than `key`,
    /// then descends from where the climb stopped. On a hit returns the node
    /// and the edges climbed plus the edges descended plus one. On a miss
    /// returns `None` and `-1`.
    ///
    /// The cost is logarithmic in the rank distance between `key` and the
    /// maximum instead of in the size of the tree.
    pub fn finger_search<Q>(&self, key: &Q) -> (Option<&Node<K, V>>, isize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some((start_ptr, climbed, ordering)) = self.climb_from_max(key) else {
            return (None, -1);
        };
        let (found, edges) = match ordering {
            Ordering::Equal => (Some(start_ptr), 1),
            _ => Self::descend(Link::Real(start_ptr), key),
        };
        match found {
            Some(node_ptr) => (
                Some(unsafe { &*node_ptr.as_ptr() }),
                (climbed + edges) as isize,
            ),
            None => (None, -1),
        }
    }

    /// Inserts a key-value pair, descending from the root.
    ///
    /// Returns the new node, the number of edges from the root to the slot
    /// where it was placed, and the number of promotions: ancestors whose
    /// height grew without needing a rotation.
    ///
    /// Fails with [`AvlError::DuplicateKey`] if the key is already present,
    /// leaving the tree unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<(&Node<K, V>, usize, usize), AvlError> {
        let start = self.root;
        self.insert_below(start, 0, key, value)
    }

    /// Inserts a key-value pair, starting the search for its slot at the
    /// maximum node as [`finger_search`](AvlTree::finger_search) does.
    ///
    /// Returns the same triple as [`insert`](AvlTree::insert), with the
    /// edge count measured from the maximum node.
    pub fn finger_insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(&Node<K, V>, usize, usize), AvlError> {
        match self.climb_from_max(&key) {
            None => self.insert(key, value),
            Some((_, _, Ordering::Equal)) => Err(AvlError::DuplicateKey),
            Some((start_ptr, climbed, _)) => {
                self.insert_below(Link::Real(start_ptr), climbed, key, value)
            }
        }
    }

    /// Removes a node from the tree and returns its key-value pair.
    ///
    /// # Safety
    ///
    /// `node` must be a handle to a node currently stored in this tree.
    pub unsafe fn delete(&mut self, node: NodeHandle<K, V>) -> (K, V) {
        debug_assert!(self.root.is_real());
        let node_ptr = node.ptr;
        self.unlink_node(node_ptr);
        self.num_nodes.set(self.num_nodes.get().map(|n| n - 1));
        self.update_bounds();
        Node::destroy(node_ptr)
    }

    /// Removes a key from the tree.
    /// Returns the key-value pair if the key was previously in the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_ptr = self.find(key)?;
        // SAFETY: the node was just found in this tree
        Some(unsafe { self.delete(NodeHandle { ptr: node_ptr }) })
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Link::Real(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                let node = node_ptr.as_ref();

                // Check link for left child node
                if let Link::Real(left_ptr) = node.left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key < node.key);
                }

                // Check link for right child node
                if let Link::Real(right_ptr) = node.right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key > node.key);
                }

                // Check height
                let height = 1 + node.left.height().max(node.right.height());
                assert_eq!(node.height, height);

                // Check AVL condition (nearly balance)
                assert!(node.balance().abs() <= 1);

                num_nodes += 1;
            });

            // Check number of nodes, if known
            if let Some(cached) = self.num_nodes.get() {
                assert_eq!(num_nodes, cached);
            }

            // Check cached extremes
            assert_eq!(self.min, Self::leftmost(self.root));
            assert_eq!(self.max, Self::rightmost(self.root));

            // Check global order
            let mut previous: Option<&K> = None;
            for (key, _) in self.iter() {
                if let Some(previous) = previous {
                    assert!(*previous < *key);
                }
                previous = Some(key);
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<NodePtr<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Self::descend(self.root, key).0
    }

    /// Walks down from `start` towards `key`.
    ///
    /// Returns the node holding `key` and the number of nodes on the path to
    /// it, or `None` and the number of edges to the sentinel reached.
    fn descend<Q>(start: Link<K, V>, key: &Q) -> (Option<NodePtr<K, V>>, usize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = start;
        let mut edges = 0;
        while let Link::Real(node_ptr) = current {
            edges += 1;
            current = unsafe {
                match key.cmp(node_ptr.as_ref().key.borrow()) {
                    Ordering::Equal => return (Some(node_ptr), edges),
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            };
        }
        (None, edges)
    }

    /// Climbs from the maximum node while nodes hold keys larger than `key`.
    ///
    /// Returns the node where the climb stopped, the number of edges climbed,
    /// and how `key` compares to that node. The climb stops at the first key
    /// not larger than `key`, or at the root. Every node on the way is on the
    /// right spine, so `key` is either at the stopping node or in its subtree.
    fn climb_from_max<Q>(&self, key: &Q) -> Option<(NodePtr<K, V>, usize, Ordering)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.max?;
        let mut climbed = 0;
        loop {
            let ordering = key.cmp(unsafe { current.as_ref() }.key.borrow());
            if ordering != Ordering::Less {
                return Some((current, climbed, ordering));
            }
            match unsafe { current.as_ref().parent } {
                Some(parent_ptr) => {
                    current = parent_ptr;
                    climbed += 1;
                }
                None => return Some((current, climbed, ordering)),
            }
        }
    }

    fn insert_below(
        &mut self,
        start: Link<K, V>,
        climbed: usize,
        key: K,
        value: V,
    ) -> Result<(&Node<K, V>, usize, usize), AvlError> {
        // Find the sentinel slot for the new key
        let mut parent: Option<NodePtr<K, V>> = None;
        let mut current = start;
        let mut edges = climbed;
        while let Link::Real(node_ptr) = current {
            parent = Some(node_ptr);
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => return Err(AvlError::DuplicateKey),
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            };
            edges += 1;
        }

        let mut node_ptr = Node::create(key, value);
        let promotions = match parent {
            None => {
                self.root = Link::Real(node_ptr);
                0
            }
            Some(mut parent_ptr) => unsafe {
                node_ptr.as_mut().parent = Some(parent_ptr);
                if node_ptr.as_ref().key < parent_ptr.as_ref().key {
                    parent_ptr.as_mut().left = Link::Real(node_ptr);
                } else {
                    parent_ptr.as_mut().right = Link::Real(node_ptr);
                }
                self.rebalance_after_insert(parent_ptr)
            },
        };

        self.num_nodes.set(self.num_nodes.get().map(|n| n + 1));
        let key = unsafe { &node_ptr.as_ref().key };
        if self.min.map_or(true, |min_ptr| *key < unsafe { min_ptr.as_ref() }.key) {
            self.min = Some(node_ptr);
        }
        if self.max.map_or(true, |max_ptr| *key > unsafe { max_ptr.as_ref() }.key) {
            self.max = Some(node_ptr);
        }

        Ok((unsafe { &*node_ptr.as_ptr() }, edges, promotions))
    }

    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            let parent = node_ptr.as_ref().parent;
            match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                (Link::Real(mut left_ptr), Link::Real(mut right_ptr)) => {
                    // Find in-order successor, the smallest node in the right sub tree
                    let mut successor_parent_ptr = node_ptr;
                    let mut successor_ptr = right_ptr;
                    while let Link::Real(next_ptr) = successor_ptr.as_ref().left {
                        successor_parent_ptr = successor_ptr;
                        successor_ptr = next_ptr;
                    }

                    if successor_parent_ptr != node_ptr {
                        // Unlink successor, its right sub tree (or a sentinel) takes its slot
                        let successor_right = successor_ptr.as_ref().right;
                        successor_parent_ptr.as_mut().left = successor_right;
                        successor_right.set_parent(Some(successor_parent_ptr));

                        successor_ptr.as_mut().right = Link::Real(right_ptr);
                        right_ptr.as_mut().parent = Some(successor_ptr);
                    }

                    // Graft successor in place of the node to-unlink
                    successor_ptr.as_mut().left = Link::Real(left_ptr);
                    left_ptr.as_mut().parent = Some(successor_ptr);
                    self.replace_child(parent, node_ptr, Link::Real(successor_ptr));

                    // Lowest node whose sub tree changed shape
                    let rebalance_from = if successor_parent_ptr == node_ptr {
                        successor_ptr
                    } else {
                        successor_parent_ptr
                    };
                    self.rebalance_path(Some(rebalance_from));
                }
                (child, Link::Sentinel) | (Link::Sentinel, child) => {
                    // Node to-unlink is stem or leaf, splice child (or a sentinel) up
                    self.replace_child(parent, node_ptr, child);
                    self.rebalance_path(parent);
                }
            }
        }
    }
}

impl<K, V> Drop for AvlTree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for AvlTree<K, V> {
    /// Creates an empty tree.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        let root = Self::clone_subtree(self.root, None);
        Self {
            root,
            min: Self::leftmost(root),
            max: Self::rightmost(root),
            num_nodes: self.num_nodes.clone(),
            marker: PhantomData,
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    /// Builds a tree from pairs; a repeated key keeps its first value.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    /// Inserts every pair whose key is not yet present.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ = self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
