use avl_tree::{AvlTree, Error};

fn main() -> Result<(), Error> {
    let mut tree: AvlTree<i32> = AvlTree::new();

    for key in [1, 7, 6, 0, 10, 3] {
        tree.insert(key)?;
        tree.assert_invariants();
        println!("{:?} (height {})", tree, tree.height());
    }

    if let Err(err) = tree.insert(6) {
        println!("insert 6: {err}");
    }

    let seven = tree.remove(&7)?;
    assert_eq!(seven, 7);
    tree.assert_invariants();
    println!("{:?} (height {})", tree, tree.height());

    while let Some(first) = tree.pop_first() {
        tree.assert_invariants();
        println!("popped {first}, {} left", tree.len());
    }

    assert!(tree.is_empty());
    Ok(())
}
