use core::iter::FusedIterator;

use crate::{
    arena::Arena,
    node::{Dir, Link, NodeId},
};

/// An ascending iterator over the keys of an [`AvlTree`](crate::AvlTree).
///
/// Created by [`AvlTree::iter`](crate::AvlTree::iter). The walk keeps an explicit stack per end,
/// so its memory use is bounded by the tree height and no recursion is involved.
pub struct Iter<'tree, T> {
    nodes: &'tree Arena<T>,

    // Each stack holds the unvisited spine toward its end of the order, nearest node on top.
    front: Vec<NodeId>,
    back: Vec<NodeId>,

    len: usize,
}

impl<'tree, T> Iter<'tree, T> {
    pub(crate) fn new(nodes: &'tree Arena<T>, root: Link) -> Self {
        let mut iter = Iter {
            nodes,
            front: Vec::new(),
            back: Vec::new(),
            len: nodes.len(),
        };

        iter.push_spine(root, Dir::Left);
        iter.push_spine(root, Dir::Right);
        iter
    }

    // Pushes the path from `opt_cur` to the extreme node of its subtree in direction `dir`.
    fn push_spine(&mut self, mut opt_cur: Link, dir: Dir) {
        let stack = match dir {
            Dir::Left => &mut self.front,
            Dir::Right => &mut self.back,
        };

        while let Some(cur) = opt_cur {
            stack.push(cur);
            opt_cur = self.nodes[cur].child(dir);
        }
    }
}

impl<'tree, T> Clone for Iter<'tree, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front.clone(),
            back: self.back.clone(),
            len: self.len,
        }
    }
}

impl<'tree, T> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        // Once both ends have met, the stacks may still hold already-yielded nodes.
        if self.len == 0 {
            return None;
        }

        let cur = self.front.pop()?;
        self.len -= 1;

        // The successor is the minimum of the right subtree, if there is one. Otherwise it is
        // already on the stack.
        let nodes = self.nodes;
        self.push_spine(nodes[cur].right(), Dir::Left);

        Some(&nodes[cur].key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, T> DoubleEndedIterator for Iter<'tree, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back.pop()?;
        self.len -= 1;

        let nodes = self.nodes;
        self.push_spine(nodes[cur].left(), Dir::Right);

        Some(&nodes[cur].key)
    }
}

impl<'tree, T> ExactSizeIterator for Iter<'tree, T> {}

impl<'tree, T> FusedIterator for Iter<'tree, T> {}
