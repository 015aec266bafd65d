use finger_avl::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    tree.insert(0, "zero").unwrap();
    tree.insert(1, "one").unwrap();
    tree.insert(2, "two").unwrap();
    assert!(tree.insert(2, "two").is_err());
    tree.finger_insert(3, "three").unwrap();
    tree.finger_insert(4, "four").unwrap();
    tree.finger_insert(5, "five").unwrap();
    assert_eq!(tree.get(&1), Some(&"one"));
    tree.remove(&1);
    assert!(tree.get(&1).is_none());

    let (node, edges) = tree.finger_search(&4);
    println!("finger search for 4: {:?} after {edges} edges", node.map(|node| node.value()));

    for (k, v) in &tree {
        println!("{k} => {v}");
    }

    let high: AvlTree<i32, &str> = (7..10).map(|key| (key, "high")).collect();
    tree.join(high, 6, "six");
    println!("joined: {:?}", tree);

    let (smaller, larger) = tree.split_at(&4).unwrap();
    println!("smaller: {:?}", smaller);
    println!("larger: {:?}", larger);
}
