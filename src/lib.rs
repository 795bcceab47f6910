//! An arena-backed AVL tree.
//!
//! Nodes live in a growable pool and refer to each other by index, so rotations and splices only
//! ever rewrite indices.
//
// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`; the empty subtree has `h = 0`.
// - The parent of a node `x` is denoted `p(x)`.
// - The balance factor of `x` is `h(right(x)) - h(left(x))`.
//
// The invariants of the tree, which hold whenever no `&mut self` method is running:
// 1. Every key in the left subtree of `x` orders before `x`, every key in the right subtree after.
// 2. All balance factors are -1, 0 or 1.
// 3. `h(x) = 1 + max(h(left(x)), h(right(x)))`, so every leaf has height 1.
// 4. If `y` is a child of `x` then `p(y) = x`; the root has no parent.
//
// Corollaries:
// 5. A tree of height `h` has at least `F(h + 2) - 1` nodes, `F` being the Fibonacci numbers, so
//    `h < 1.45 log2(n + 2)`.
// 6. After an insertion, the lowest unbalanced ancestor has a factor of +-2 and a single or
//    double rotation there restores its pre-insertion height. No other rotation is needed.
// 7. After a removal a rotation may lower the height of its subtree by one, which can unbalance
//    the next ancestor up. Repair has to continue to the root.

use core::{cmp::Ordering, fmt, mem};

use tracing::trace;

mod arena;
mod balance;
mod error;
mod iter;
mod node;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use error::Error;
pub use iter::Iter;

use arena::Arena;
use balance::Repair;
use node::{Dir, Link, Node, NodeId};

/// An ordered set of unique keys stored in an AVL tree.
///
/// Keys are ordered by a three-way comparator `C`, which defaults to the natural ordering of `T`.
/// Two keys are considered equal when the comparator returns [`Ordering::Equal`].
///
/// `insert`, `remove` and `contains` complete in _O(log(n))_ time.
///
/// ```
/// use avl_tree::{AvlTree, Error};
///
/// let mut tree = AvlTree::new();
/// tree.insert(3).unwrap();
/// tree.insert(1).unwrap();
///
/// assert_eq!(tree.insert(3), Err(Error::DuplicateKey));
/// assert!(tree.contains(&1));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3]);
/// ```
#[derive(Clone)]
pub struct AvlTree<T, C = fn(&T, &T) -> Ordering> {
    nodes: Arena<T>,
    root: Link,
    cmp: C,
}

impl<T: Ord> AvlTree<T> {
    /// Returns a new empty tree using the natural ordering of `T`.
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }

    /// Returns a new empty tree with room for `capacity` keys before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, T::cmp)
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Returns a new empty tree ordered by `cmp`.
    ///
    /// `cmp` must be a total order over every key that will be stored in the tree.
    ///
    /// ```
    /// use avl_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::with_comparator(|a: &u32, b: &u32| b.cmp(a));
    /// tree.insert_all([1, 3, 2]).unwrap();
    ///
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        AvlTree {
            nodes: Arena::default(),
            root: None,
            cmp,
        }
    }

    /// Returns a new empty tree ordered by `cmp`, with room for `capacity` keys.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        AvlTree {
            nodes: Arena::with_capacity(capacity),
            root: None,
            cmp,
        }
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    pub fn contains(&self, key: &T) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the stored key equal to `key`.
    pub fn get(&self, key: &T) -> Option<&T> {
        let node = self.find(key)?;
        Some(&self.nodes[node].key)
    }

    /// Returns the minimum key of the tree.
    pub fn first(&self) -> Option<&T> {
        let node = self.extreme_in_subtree(self.root?, Dir::Left);
        Some(&self.nodes[node].key)
    }

    /// Returns the maximum key of the tree.
    pub fn last(&self) -> Option<&T> {
        let node = self.extreme_in_subtree(self.root?, Dir::Right);
        Some(&self.nodes[node].key)
    }

    /// Returns an iterator over the keys of the tree in ascending order.
    ///
    /// Every call starts a fresh walk from the minimum key.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.root)
    }

    fn find(&self, key: &T) -> Link {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            match (self.cmp)(key, &self.nodes[cur].key) {
                Ordering::Less => opt_cur = self.nodes[cur].left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = self.nodes[cur].right(),
            }
        }
    }

    /// Inserts `key` into the tree.
    ///
    /// Returns [`Error::DuplicateKey`] without modifying the tree if an equal key is already
    /// present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: T) -> Result<(), Error> {
        let Some(root) = self.root else {
            // Tree is empty. The new node becomes the root and nothing can be unbalanced.
            self.root = Some(self.nodes.alloc(Node::new(key, None)));
            trace!(len = self.len(), "inserted root");
            return Ok(());
        };

        let mut parent = root;

        // Descend the tree, looking for the empty slot where `key` belongs.
        let dir = loop {
            let dir = match (self.cmp)(&key, &self.nodes[parent].key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(Error::DuplicateKey),
                Ordering::Greater => Dir::Right,
            };

            match self.nodes[parent].child(dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        let node = self.nodes.alloc(Node::new(key, Some(parent)));
        self.nodes[parent].set_child(dir, Some(node));

        self.repair(parent, Repair::Insert);

        trace!(len = self.len(), height = self.height(), "inserted");
        Ok(())
    }

    /// Inserts every key of `keys` in order.
    ///
    /// Stops at the first duplicate and returns [`Error::DuplicateKey`]. Keys inserted before the
    /// duplicate remain in the tree.
    pub fn insert_all<I>(&mut self, keys: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
    {
        for key in keys {
            self.insert(key)?;
        }

        Ok(())
    }

    /// Removes the key equal to `key` from the tree and returns it.
    ///
    /// Returns [`Error::NotFound`] without modifying the tree if no such key is present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove(&mut self, key: &T) -> Result<T, Error> {
        let node = self.find(key).ok_or(Error::NotFound)?;
        Ok(self.remove_at(node))
    }

    /// Removes and returns the minimum key of the tree.
    pub fn pop_first(&mut self) -> Option<T> {
        let node = self.extreme_in_subtree(self.root?, Dir::Left);
        Some(self.remove_at(node))
    }

    /// Removes and returns the maximum key of the tree.
    pub fn pop_last(&mut self) -> Option<T> {
        let node = self.extreme_in_subtree(self.root?, Dir::Right);
        Some(self.remove_at(node))
    }

    /// Clears the tree, removing all keys. Capacity is retained.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }
}

impl<T, C> AvlTree<T, C> {
    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of keys the tree can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the height of the tree, which is 0 for an empty tree and 1 for a single key.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    // Returns the node at the end of the path from `root` that always goes in direction `dir`.
    fn extreme_in_subtree(&self, root: NodeId, dir: Dir) -> NodeId {
        let mut cur = root;

        while let Some(next) = self.nodes[cur].child(dir) {
            cur = next;
        }

        cur
    }

    // There are three possible cases:
    //
    // 1. `node` is a leaf. It is unlinked from its parent.
    // 2. `node` has one child. The child takes its place under `node`'s parent.
    // 3. `node` has two children. Its predecessor[^1] has no right child, so it is unlinked as in
    //    case 1 or 2, and its key is moved into `node`. `node` itself stays in place with all of
    //    its links.
    //
    // In every case the repair walk runs from the parent of the unlinked node to the root.
    //
    // [^1]: The predecessor of a node `a` is the greatest node in `a`'s left subtree.
    fn remove_at(&mut self, node: NodeId) -> T {
        let (Some(left), Some(_)) = (self.nodes[node].left(), self.nodes[node].right()) else {
            let key = self.unlink(node);
            trace!(len = self.len(), "removed");
            return key;
        };

        let predecessor = self.extreme_in_subtree(left, Dir::Right);
        let predecessor_key = self.unlink(predecessor);

        trace!(len = self.len(), "removed by predecessor substitution");
        mem::replace(&mut self.nodes[node].key, predecessor_key)
    }

    // Unlinks and frees `node`, which must have at most one child, and repairs its ancestors.
    fn unlink(&mut self, node: NodeId) -> T {
        let parent = self.nodes[node].parent();
        let left = self.nodes[node].left();
        let right = self.nodes[node].right();

        assert!(
            left.is_none() || right.is_none(),
            "only a node with at most one child can be unlinked"
        );

        // Splice the sole child, if any, into `node`'s place.
        let child = left.or(right);
        self.replace_child_or_set_root(parent, node, child);
        if let Some(child) = child {
            self.nodes[child].set_parent(parent);
        }

        let removed = self.nodes.free(node);
        debug_assert!(child.is_some() || removed.is_leaf());

        if let Some(parent) = parent {
            self.repair(parent, Repair::Remove);
        }

        removed.into_key()
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`, or the root if
    // `parent` is `None`.
    //
    // `new_child`'s parent link is not updated.
    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.nodes[parent].which_child(old_child);
                self.nodes[parent].set_child(dir, new_child);
            }
            None => {
                debug_assert_eq!(self.root, Some(old_child));
                self.root = new_child;
            }
        }
    }
}

impl<T, C> AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len(), 0, "empty tree must have no nodes");
            return;
        };

        assert_eq!(self.nodes[root].parent(), None, "root must not have a parent");

        let reachable = self.assert_invariants_at(root);
        assert_eq!(reachable, self.len(), "every node must be reachable from the root");

        // Parent/child order only checks neighbors, so check the whole sequence as well.
        for (a, b) in self.iter().zip(self.iter().skip(1)) {
            assert_eq!((self.cmp)(a, b), Ordering::Less, "keys must be strictly ascending");
        }
    }

    // Returns the number of nodes in the subtree.
    fn assert_invariants_at(&self, node: NodeId) -> usize {
        let links = &self.nodes[node];
        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = links.child(dir) {
                // Ensure child's parent link points to this node.
                let parent = self.nodes[child]
                    .parent()
                    .expect("child parent pointer not set");
                assert_eq!(node, parent);

                let expected = match dir {
                    Dir::Left => Ordering::Less,
                    Dir::Right => Ordering::Greater,
                };
                assert_eq!((self.cmp)(&self.nodes[child].key, &links.key), expected);

                count += self.assert_invariants_at(child);
            }
        }

        let left = self.height_of(links.left());
        let right = self.height_of(links.right());

        assert_eq!(links.height(), 1 + left.max(right), "stale height");
        assert!(left.abs_diff(right) <= 1, "balance factor out of range");

        count
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Iter::new(&self.nodes, self.root))
            .finish()
    }
}

impl<'tree, T, C> IntoIterator for &'tree AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C> Extend<T> for AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Inserts every key of `iter`, skipping keys that are already present.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            // Duplicates are dropped, as with the standard library's sets.
            let _ = self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut tree = AvlTree::with_capacity(iter.size_hint().0);
        tree.extend(iter);
        tree
    }
}
