use thiserror::Error;

/// The ways an [`AvlTree`](crate::AvlTree) operation can be refused.
///
/// Both are expected outcomes. A refused operation leaves the tree unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An equal key is already stored in the tree.
    #[error("key is already present in the tree")]
    DuplicateKey,
    /// No equal key is stored in the tree.
    #[error("key is not present in the tree")]
    NotFound,
}
