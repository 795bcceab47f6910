//! Height maintenance and rotations.
//!
//! Every structural change in the tree is followed by a repair walk starting at the lowest node
//! whose subtree changed. The walk recomputes heights bottom-up and rotates wherever a node's
//! children differ in height by more than one.

use core::cmp;

use tracing::trace;

use crate::{
    node::{Dir, Link, NodeId},
    AvlTree,
};

/// Which structural change a repair walk follows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Repair {
    /// A single insertion needs at most one (single or double) rotation. The walk stops after it.
    Insert,
    /// A removal can unbalance every ancestor in turn. The walk always reaches the root.
    Remove,
}

impl<T, C> AvlTree<T, C> {
    /// Returns the height of the subtree at `link`; the empty subtree has height 0.
    #[inline]
    pub(crate) fn height_of(&self, link: Link) -> u32 {
        link.map_or(0, |node| self.nodes[node].height())
    }

    /// Sets the height of `node` from the cached heights of its children.
    ///
    /// The children must already be up to date.
    pub(crate) fn recompute_height(&mut self, node: NodeId) {
        let left = self.height_of(self.nodes[node].left());
        let right = self.height_of(self.nodes[node].right());
        self.nodes[node].set_height(1 + cmp::max(left, right));
    }

    /// Returns `height(right) - height(left)`.
    #[inline]
    pub(crate) fn balance_factor(&self, node: NodeId) -> i32 {
        let left = self.height_of(self.nodes[node].left());
        let right = self.height_of(self.nodes[node].right());
        right as i32 - left as i32
    }

    /// Restores the balance of `node` if its children differ in height by more than one.
    ///
    /// Returns the node that took `node`'s place if a rotation was performed.
    pub(crate) fn rebalance(&mut self, node: NodeId) -> Option<NodeId> {
        let heavy = match self.balance_factor(node) {
            diff if diff > 1 => Dir::Right,
            diff if diff < -1 => Dir::Left,
            _ => return None,
        };

        let child = self.nodes[node]
            .child(heavy)
            .expect("heavy side of an unbalanced node must not be empty");

        // A child leaning back toward the inside needs a double rotation.
        let child_diff = self.balance_factor(child);
        let zig_zag = match heavy {
            Dir::Right => child_diff < 0,
            Dir::Left => child_diff > 0,
        };

        if zig_zag {
            let grandchild = self.nodes[child]
                .child(!heavy)
                .expect("inner side of a zig-zag must not be empty");

            trace!(?heavy, "double rotation");
            self.rotate_at(child, grandchild);
            self.rotate_at(node, grandchild);
            Some(grandchild)
        } else {
            trace!(?heavy, "single rotation");
            self.rotate_at(node, child);
            Some(child)
        }
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // The heights of `down` and then `up` are recomputed; nothing above them is touched.
    pub(crate) fn rotate_at(&mut self, down: NodeId, up: NodeId) {
        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let dir = !self.nodes[down].which_child(up);

        let across = self.nodes[up].child(dir);
        self.nodes[down].set_child(!dir, across);
        if let Some(across) = across {
            self.nodes[across].set_parent(Some(down));
        }

        self.nodes[up].set_child(dir, Some(down));
        let parent = self.nodes[down].set_parent(Some(up));
        self.nodes[up].set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.recompute_height(down);
        self.recompute_height(up);
    }

    /// Walks from `start` to the root, fixing heights and rotating unbalanced nodes.
    pub(crate) fn repair(&mut self, start: NodeId, mode: Repair) {
        let mut opt_cur = Some(start);

        while let Some(cur) = opt_cur {
            self.recompute_height(cur);

            let top = match self.rebalance(cur) {
                // The rotated subtree is back to its height before the insertion, so every
                // ancestor above it is already correct.
                Some(_) if mode == Repair::Insert => return,
                Some(top) => top,
                None => cur,
            };

            opt_cur = self.nodes[top].parent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a tree from `keys` without any rebalancing, as a plain BST would.
    fn unbalanced(keys: &[u32]) -> AvlTree<u32> {
        let mut tree = AvlTree::new();

        for &key in keys {
            tree.insert_unbalanced(key);
        }

        tree
    }

    impl AvlTree<u32> {
        fn insert_unbalanced(&mut self, key: u32) {
            use crate::node::Node;

            let Some(mut parent) = self.root else {
                self.root = Some(self.nodes.alloc(Node::new(key, None)));
                return;
            };

            let dir = loop {
                let dir = if key < self.nodes[parent].key {
                    Dir::Left
                } else {
                    Dir::Right
                };

                match self.nodes[parent].child(dir) {
                    Some(child) => parent = child,
                    None => break dir,
                }
            };

            let node = self.nodes.alloc(Node::new(key, Some(parent)));
            self.nodes[parent].set_child(dir, Some(node));

            let mut opt_cur = Some(parent);
            while let Some(cur) = opt_cur {
                self.recompute_height(cur);
                opt_cur = self.nodes[cur].parent();
            }
        }

        fn root_key(&self) -> u32 {
            self.nodes[self.root.unwrap()].key
        }
    }

    #[test]
    fn height_of_empty_is_zero() {
        let tree: AvlTree<u32> = AvlTree::new();
        assert_eq!(tree.height_of(None), 0);
    }

    #[test]
    fn balance_factor_of_chain() {
        let tree = unbalanced(&[1, 2, 3]);
        let root = tree.root.unwrap();

        assert_eq!(tree.balance_factor(root), 2);
        assert_eq!(tree.nodes[root].height(), 3);
    }

    #[test]
    fn single_left_rotation() {
        let mut tree = unbalanced(&[1, 2, 3]);
        let root = tree.root.unwrap();

        let top = tree.rebalance(root).expect("right-right chain must rotate");
        assert_eq!(tree.nodes[top].key, 2);
        assert_eq!(tree.root_key(), 2);
        tree.assert_invariants();
    }

    #[test]
    fn single_right_rotation() {
        let mut tree = unbalanced(&[3, 2, 1]);
        let root = tree.root.unwrap();

        tree.rebalance(root).expect("left-left chain must rotate");
        assert_eq!(tree.root_key(), 2);
        tree.assert_invariants();
    }

    #[test]
    fn right_left_double_rotation() {
        let mut tree = unbalanced(&[1, 3, 2]);
        let root = tree.root.unwrap();

        let top = tree.rebalance(root).expect("right-left zig-zag must rotate");
        assert_eq!(tree.nodes[top].key, 2);
        assert_eq!(tree.root_key(), 2);
        tree.assert_invariants();
    }

    #[test]
    fn left_right_double_rotation() {
        let mut tree = unbalanced(&[3, 1, 2]);
        let root = tree.root.unwrap();

        tree.rebalance(root).expect("left-right zig-zag must rotate");
        assert_eq!(tree.root_key(), 2);
        tree.assert_invariants();
    }

    #[test]
    fn balanced_node_is_left_alone() {
        let mut tree = unbalanced(&[2, 1, 3]);
        let root = tree.root.unwrap();

        assert_eq!(tree.rebalance(root), None);
        assert_eq!(tree.root_key(), 2);
    }

    #[test]
    fn rotation_below_root_rewires_grandparent() {
        //     4              4
        //    / \            / \
        //   2   5    =>    2   6
        //  /     \        /   / \
        // 1       6      1   5   7
        //          \
        //           7
        let mut tree = unbalanced(&[4, 2, 5, 1, 6, 7]);
        let five = tree.nodes[tree.root.unwrap()].right().unwrap();

        tree.repair(five, Repair::Remove);
        tree.assert_invariants();

        let keys: Vec<_> = tree.iter().copied().collect();
        assert_eq!(keys, [1, 2, 4, 5, 6, 7]);
        assert_eq!(tree.root_key(), 4);
    }

    #[test]
    fn insert_repair_stops_after_first_rotation() {
        // 1                 1
        //  \                 \
        //   2                 2
        //    \       =>        \
        //     3                 4
        //      \               / \
        //       4             3   5
        //        \
        //         5
        let mut tree = unbalanced(&[1, 2, 3, 4, 5]);
        let root = tree.root.unwrap();
        let two = tree.nodes[root].right().unwrap();
        let four = tree.find(&4).unwrap();

        tree.repair(four, Repair::Insert);

        // Only the rotation at 3 happened; 1 and 2 were not visited.
        assert_eq!(tree.root_key(), 1);
        assert_eq!(tree.nodes[root].right(), Some(two));
        assert_eq!(tree.nodes[two].right(), Some(four));
        assert_eq!(tree.nodes[four].parent(), Some(two));
        assert_eq!(tree.nodes[two].height(), 4, "ancestor heights left untouched");
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn remove_repair_continues_to_root() {
        let mut tree = unbalanced(&[1, 2, 3, 4, 5]);
        let four = tree.find(&4).unwrap();

        tree.repair(four, Repair::Remove);

        tree.assert_invariants();
        assert_eq!(tree.root_key(), 2);
        assert_eq!(tree.height(), 3);
    }
}
