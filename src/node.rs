use core::{mem, ops::Not};

/// A stable index of a node in the tree's [`Arena`](crate::arena::Arena).
///
/// Rotations and splices only ever rewrite these indices, so a `NodeId` held by the tree stays
/// valid until its node is freed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> NodeId {
        match u32::try_from(index) {
            Ok(index) => NodeId(index),
            Err(_) => panic!("cannot have more than u32::MAX nodes in a tree"),
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A link to a subtree. `None` is the empty subtree, which has height 0.
pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A single element of the tree.
///
/// Both children are owned exclusively by this node. `parent` is a back-reference used for
/// upward traversal and never owns anything.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) key: T,
    parent: Link,
    children: [Link; 2],
    height: u32,
}

impl<T> Node<T> {
    /// Returns a new leaf holding `key`.
    pub(crate) fn new(key: T, parent: Link) -> Node<T> {
        Node {
            key,
            parent,
            children: [None; 2],
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn into_key(self) -> T {
        self.key
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    /// Returns the side `child` hangs on.
    ///
    /// Panics if `child` is not a child of this node.
    #[inline]
    pub(crate) fn which_child(&self, child: NodeId) -> Dir {
        if self.left() == Some(child) {
            Dir::Left
        } else if self.right() == Some(child) {
            Dir::Right
        } else {
            unreachable!("{child:?} is not a child of this node");
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: u32) {
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_not() {
        assert_eq!(!Dir::Left, Dir::Right);
        assert_eq!(!Dir::Right, Dir::Left);
    }

    #[test]
    fn new_node_is_leaf() {
        let node = Node::new('a', Some(NodeId::new(3)));
        assert!(node.is_leaf());
        assert_eq!(node.height(), 1);
        assert_eq!(node.parent(), Some(NodeId::new(3)));
    }

    #[test]
    fn which_child() {
        let mut node = Node::new(0, None);
        node.set_child(Dir::Left, Some(NodeId::new(1)));
        node.set_child(Dir::Right, Some(NodeId::new(2)));

        assert_eq!(node.which_child(NodeId::new(1)), Dir::Left);
        assert_eq!(node.which_child(NodeId::new(2)), Dir::Right);
        assert!(!node.is_leaf());
    }

    #[test]
    #[should_panic]
    fn which_child_of_stranger() {
        let node: Node<u8> = Node::new(0, None);
        node.which_child(NodeId::new(7));
    }
}
