use core::ops::{Index, IndexMut};

use crate::node::{Link, Node, NodeId};

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    /// A freed slot, linking to the next free slot.
    Vacant { next_free: Link },
}

/// A growable pool of tree nodes addressed by [`NodeId`].
///
/// Freed slots are kept on an intrusive free list and reused by later allocations. Indices are
/// never shifted, so every id handed out stays valid until it is freed.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    /// Head of the free list, or `None` if every slot is occupied.
    free_head: Link,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Arena<T> {
        Arena {
            slots: Vec::with_capacity(capacity),
            ..Arena::default()
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Moves `node` into the arena and returns its id.
    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;

        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.index()];
            self.free_head = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            *slot = Slot::Occupied(node);
            return id;
        }

        let id = NodeId::new(self.slots.len());
        self.slots.push(Slot::Occupied(node));
        id
    }

    /// Frees the slot of `id`, returning the node that was stored there.
    ///
    /// Panics if `id` was already freed.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<T> {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        match core::mem::replace(&mut self.slots[id.index()], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(id);
                self.len -= 1;
                node
            }
            Slot::Vacant { .. } => panic!("double free of {id:?}"),
        }
    }

    /// Drops every node. Capacity is retained.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {id:?}"),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn alloc_free_reuse() {
        let mut arena = Arena::default();
        assert_eq!(arena.len(), 0);

        let a = arena.alloc(Node::new(10, None));
        let b = arena.alloc(Node::new(20, Some(a)));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a].key, 10);
        assert_eq!(arena[b].key, 20);

        // Freeing `a` must not move `b`.
        assert_eq!(arena.free(a).into_key(), 10);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[b].key, 20);

        // The freed slot is reused.
        let c = arena.alloc(Node::new(30, None));
        assert_eq!(c, a);
        assert_eq!(arena[c].key, 30);
        assert_eq!(arena[b].key, 20);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn free_list_is_lifo() {
        let mut arena = Arena::default();
        let ids: Vec<_> = (0..4).map(|k| arena.alloc(Node::new(k, None))).collect();

        arena.free(ids[1]);
        arena.free(ids[3]);

        assert_eq!(arena.alloc(Node::new(7, None)), ids[3]);
        assert_eq!(arena.alloc(Node::new(8, None)), ids[1]);
        assert_eq!(arena.alloc(Node::new(9, None)), NodeId::new(4));
    }

    #[test]
    fn clear_drops_nodes() {
        let value = Rc::new(());
        let mut arena = Arena::with_capacity(8);
        let capacity = arena.capacity();
        assert!(capacity >= 8);

        for _ in 0..4 {
            arena.alloc(Node::new(Rc::clone(&value), None));
        }
        assert_eq!(Rc::strong_count(&value), 5);

        arena.clear();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(Rc::strong_count(&value), 1);
    }

    #[test]
    #[should_panic]
    fn double_free() {
        let mut arena = Arena::default();
        let id = arena.alloc(Node::new((), None));
        arena.free(id);
        arena.free(id);
    }

    #[test]
    #[should_panic]
    fn index_freed() {
        let mut arena = Arena::default();
        let id = arena.alloc(Node::new((), None));
        arena.free(id);
        let _ = &arena[id];
    }
}
