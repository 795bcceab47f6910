//! Model-based testing of [`AvlTree`] against [`BTreeSet`].
//!
//! The same operations are used by the proptest suite and by the fuzz targets.

extern crate std;

use std::{collections::BTreeSet, prelude::v1::*};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Error};

/// A key operand.
///
/// `Index` picks one of the keys inserted so far (so removals and lookups hit often), `Random`
/// is an arbitrary key that may or may not be present.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    InsertAll(Vec<ItemValue>),
    Contains(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
    Clear,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::InsertAll(items) => FinalOp::InsertAll(
                items
                    .into_iter()
                    .map(|item| get_value(sorted, item))
                    .collect(),
            ),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Clone, Debug)]
enum FinalOp {
    Insert(u32),
    InsertAll(Vec<u32>),
    Contains(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
    Clear,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        1 => proptest::collection::vec(value_strategy(), 0..8).prop_map(Op::InsertAll),
        2 => value_strategy().prop_map(Op::Contains),
        3 => value_strategy().prop_map(Op::Remove),
        1 => Just(Op::First),
        1 => Just(Op::PopFirst),
        1 => Just(Op::Last),
        1 => Just(Op::PopLast),
        1 => Just(Op::Clear),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();

    // Keys ever inserted, so `ItemValue::Index` can also name keys that were removed since.
    let mut seen = Vec::with_capacity(ops.len());

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn btree_insert(btree: &mut BTreeSet<u32>, value: u32) -> Result<(), Error> {
        if btree.insert(value) {
            Ok(())
        } else {
            Err(Error::DuplicateKey)
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.clone().finalize(&seen);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut seen, value);

                let from_btree = btree_insert(&mut btree, value);
                let from_avl = avl.insert(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::InsertAll(values) => {
                for &value in &values {
                    insert_sorted(&mut seen, value);
                }

                let from_btree = values
                    .iter()
                    .try_for_each(|&value| btree_insert(&mut btree, value));
                let from_avl = avl.insert_all(values);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Contains(value) => {
                let from_btree = btree.contains(&value);
                let from_avl = avl.contains(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
                assert_eq!(btree.get(&value), avl.get(&value), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Remove(value) => {
                let from_btree = btree.take(&value).ok_or(Error::NotFound);
                let from_avl = avl.remove(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::First => {
                assert_eq!(btree.first(), avl.first(), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopFirst => {
                assert_eq!(btree.pop_first(), avl.pop_first(), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Last => {
                assert_eq!(btree.last(), avl.last(), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopLast => {
                assert_eq!(btree.pop_last(), avl.pop_last(), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Clear => {
                btree.clear();
                avl.clear();
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert_eq!(btree.is_empty(), avl.is_empty());
        assert!(btree.iter().eq(avl.iter()));
        assert!(btree.iter().rev().eq(avl.iter().rev()));
    }
}
