use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use finger_avl::AvlTree;

const REPEATS: usize = 20;

/// Swaps each pair of neighbours with probability one half.
fn swap_adjacent(keys: &mut [u32], rng: &mut StdRng) {
    for i in 0..keys.len().saturating_sub(1) {
        if rng.gen_bool(0.5) {
            keys.swap(i, i + 1);
        }
    }
}

fn count_inversions(keys: &[u32]) -> usize {
    let mut inversions = 0;
    for (i, lhs) in keys.iter().enumerate() {
        inversions += keys[i + 1..].iter().filter(|rhs| lhs > rhs).count();
    }
    inversions
}

/// Finger inserts all keys in order, then finger searches them in the same
/// order. Returns the total promotions and the total search edges.
fn measure(keys: &[u32]) -> (usize, isize) {
    let mut tree = AvlTree::new();
    let mut promotions = 0;
    for key in keys {
        if let Ok((_, _, promoted)) = tree.finger_insert(*key, ()) {
            promotions += promoted;
        }
    }
    let edges = keys.iter().map(|key| tree.finger_search(key).1).sum();
    (promotions, edges)
}

fn main() {
    let mut rng = StdRng::seed_from_u64(0);

    println!(
        "{:>6} {:>16} {:>12} {:>16} {:>14}",
        "n", "order", "promotions", "inversions", "search edges"
    );
    for i in 1..=6 {
        let n = 111 * (1 << i);
        let sorted: Vec<u32> = (0..n).collect();

        for order in ["sorted", "reverse_sorted", "random", "random_swap"] {
            let mut promotions = 0;
            let mut inversions = 0;
            let mut edges = 0;
            for _ in 0..REPEATS {
                let mut keys = sorted.clone();
                match order {
                    "reverse_sorted" => keys.reverse(),
                    "random" => keys.shuffle(&mut rng),
                    "random_swap" => swap_adjacent(&mut keys, &mut rng),
                    _ => {}
                }
                let (promoted, searched) = measure(&keys);
                promotions += promoted;
                inversions += count_inversions(&keys);
                edges += searched;
            }
            println!(
                "{:>6} {:>16} {:>12.2} {:>16.2} {:>14.2}",
                n,
                order,
                promotions as f64 / REPEATS as f64,
                inversions as f64 / REPEATS as f64,
                edges as f64 / REPEATS as f64,
            );
        }
    }
}
