use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use finger_avl::AvlTree;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();
    let sorted: Vec<i32> = (0..N as i32).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &values {
                let _ = black_box(tree.insert(*value, *value).is_ok());
            }
        })
    });

    c.bench_function("tree_insert_sorted", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &sorted {
                let _ = black_box(tree.insert(*value, *value).is_ok());
            }
        })
    });

    c.bench_function("tree_finger_insert_sorted", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &sorted {
                let _ = black_box(tree.finger_insert(*value, *value).is_ok());
            }
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        let _ = tree.insert(*value, *value);
    }

    c.bench_function("tree_search", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.search(value).1);
            }
        })
    });

    let sorted_tree: AvlTree<i32, i32> = sorted.iter().map(|value| (*value, *value)).collect();
    let near_max = &sorted[N - 64..];

    c.bench_function("tree_search_near_max", |b| {
        b.iter(|| {
            for value in near_max {
                black_box(sorted_tree.search(value).1);
            }
        })
    });

    c.bench_function("tree_finger_search_near_max", |b| {
        b.iter(|| {
            for value in near_max {
                black_box(sorted_tree.finger_search(value).1);
            }
        })
    });

    c.bench_function("tree_iter", |b| {
        b.iter(|| {
            for (k, v) in &tree {
                black_box((k, v));
            }
        })
    });

    c.bench_function("tree_remove", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            for value in &values {
                black_box(tree.remove(value));
            }
        })
    });

    c.bench_function("tree_split_join", |b| {
        let mut tree = sorted_tree.clone();
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            let key = rng.gen_range(0..N as i32);
            if let Ok((mut smaller, larger)) = tree.split_at(&key) {
                smaller.join(larger, key, key);
                tree = smaller;
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
