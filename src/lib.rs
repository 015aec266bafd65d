//! An ordered dictionary backed by an AVL tree.
//!
//! [`AvlTree`] supports logarithmic search, insertion and deletion, finger
//! search and finger insertion starting from the maximum node, and
//! whole-tree [`join`](AvlTree::join) and [`split`](AvlTree::split).
//!
//! Missing children are represented by sentinels of height -1, so every real
//! node has exactly two child links.
//!
//! ```
//! use finger_avl::AvlTree;
//!
//! let mut low: AvlTree<i32, &str> = (0..10).map(|key| (key, "low")).collect();
//! let high: AvlTree<i32, &str> = (11..20).map(|key| (key, "high")).collect();
//! low.join(high, 10, "middle");
//! assert_eq!(low.len(), 20);
//!
//! let (smaller, larger) = low.split_at(&15).unwrap();
//! assert_eq!(smaller.max_node().map(|node| *node.key()), Some(14));
//! assert_eq!(larger.min_node().map(|node| *node.key()), Some(16));
//! ```

mod error;
mod iter;
mod node;
mod tree;

pub use error::AvlError;
pub use iter::{IntoIter, Iter};
pub use node::{Node, NodeHandle};
pub use tree::AvlTree;
