use std::cmp;
use std::fmt;
use std::ptr::NonNull;

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;

/// A child slot of a real node: either another real node or a sentinel.
///
/// Sentinels are virtual leaves of height -1. Every real node always has two
/// child links, so height and balance computations never branch on missing
/// children.
pub(crate) enum Link<K, V> {
    Sentinel,
    Real(NodePtr<K, V>),
}

impl<K, V> Clone for Link<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Link<K, V> {}

impl<K, V> PartialEq for Link<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Link::Sentinel, Link::Sentinel) => true,
            (Link::Real(lhs), Link::Real(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl<K, V> Eq for Link<K, V> {}

impl<K, V> Link<K, V> {
    pub(crate) fn height(self) -> i32 {
        match self {
            Link::Sentinel => -1,
            Link::Real(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    pub(crate) fn real(self) -> Option<NodePtr<K, V>> {
        match self {
            Link::Sentinel => None,
            Link::Real(node_ptr) => Some(node_ptr),
        }
    }

    pub(crate) fn is_real(self) -> bool {
        matches!(self, Link::Real(_))
    }

    /// Points the parent link of a real child at `parent`. No-op on a sentinel.
    pub(crate) fn set_parent(self, parent: Option<NodePtr<K, V>>) {
        if let Link::Real(mut node_ptr) = self {
            unsafe { node_ptr.as_mut().parent = parent };
        }
    }
}

/// A real node of an [`AvlTree`](crate::AvlTree), holding one key-value pair.
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Option<NodePtr<K, V>>,
    pub(crate) height: i32,
}

impl<K, V> Node<K, V> {
    /// Returns the key stored in this node.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value stored in this node.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the height of the subtree rooted at this node.
    /// A leaf has height 0.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the left child, or `None` if the slot holds a sentinel.
    pub fn left(&self) -> Option<&Node<K, V>> {
        self.left.real().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the right child, or `None` if the slot holds a sentinel.
    pub fn right(&self) -> Option<&Node<K, V>> {
        self.right.real().map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the parent, or `None` for the root.
    pub fn parent(&self) -> Option<&Node<K, V>> {
        self.parent.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns a handle that identifies this node in later calls to
    /// [`AvlTree::delete`](crate::AvlTree::delete) or
    /// [`AvlTree::split`](crate::AvlTree::split).
    pub fn handle(&self) -> NodeHandle<K, V> {
        NodeHandle {
            ptr: NonNull::from(self),
        }
    }

    pub(crate) fn create(key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            left: Link::Sentinel,
            right: Link::Sentinel,
            parent: None,
            height: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Frees a node and hands back its pair. Links are not inspected.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) -> (K, V) {
        let boxed = Box::from_raw(node_ptr.as_ptr());
        (boxed.key, boxed.value)
    }

    /// Turns a linked node back into a detached leaf.
    pub(crate) fn reset(&mut self) {
        self.left = Link::Sentinel;
        self.right = Link::Sentinel;
        self.parent = None;
        self.height = 0;
    }

    pub(crate) fn balance(&self) -> i32 {
        self.left.height() - self.right.height()
    }

    pub(crate) fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(self.left.height(), self.right.height());
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("height", &self.height)
            .finish()
    }
}

/// An opaque reference to a node, obtained from [`Node::handle`].
///
/// A handle does not borrow the tree. It stays meaningful for as long as its
/// node is stored in some tree: across inserts, deletes of other nodes,
/// joins and splits of other nodes.
pub struct NodeHandle<K, V> {
    pub(crate) ptr: NodePtr<K, V>,
}

impl<K, V> Clone for NodeHandle<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeHandle<K, V> {}

impl<K, V> PartialEq for NodeHandle<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<K, V> Eq for NodeHandle<K, V> {}

impl<K, V> fmt::Debug for NodeHandle<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("NodeHandle").field(&self.ptr).finish()
    }
}
