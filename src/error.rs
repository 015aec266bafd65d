use thiserror::Error;

/// Errors reported by [`AvlTree`](crate::AvlTree) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AvlError {
    /// The key is already stored in the tree; the tree is left unchanged.
    #[error("key is already present in the tree")]
    DuplicateKey,
    /// No node with the requested key exists in the tree.
    #[error("key not found in the tree")]
    KeyNotFound,
}
