//! Property-based tests for `QuadTree`.
//!
//! Positions are drawn from a seeded generator so that shrinking never collapses them onto
//! duplicates, and a plain vector of elements serves as the oracle.

use proptest::prelude::*;
use quadsample::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const UNIT: Region = Region::new([0.0, 0.0], [1.0, 1.0]);

fn random_points(seed: u64, n: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| [rng.gen(), rng.gen()]).collect()
}

fn policy() -> impl Strategy<Value = SplitPolicy> {
    prop_oneof![Just(SplitPolicy::Theoretical), Just(SplitPolicy::Adaptive)]
}

fn build(points: &[[f64; 2]], capacity: usize, policy: SplitPolicy) -> QuadTree<u32, [f64; 2]> {
    let config = QuadTreeConfig::default()
        .with_capacity(capacity)
        .with_split_policy(policy);
    let mut tree = QuadTree::with_config(UNIT, config).unwrap();
    for (id, &point) in points.iter().enumerate() {
        tree.insert(id as u32, point);
    }
    tree
}

fn brute_force(points: &[(u32, [f64; 2])], center: [f64; 2], radius: f64) -> Vec<u32> {
    let mut found: Vec<u32> = points
        .iter()
        .filter(|(_, p)| p.distance_squared(&center) < radius * radius)
        .map(|&(id, _)| id)
        .collect();
    found.sort_unstable();
    found
}

fn sorted(mut v: Vec<u32>) -> Vec<u32> {
    v.sort_unstable();
    v
}

/// Leaves tile the tree region, hold their elements inside their region and below capacity.
fn check_leaves(tree: &QuadTree<u32, [f64; 2]>) -> Result<(), TestCaseError> {
    let mut area = 0.0;
    let mut count = 0;
    for (_, cell) in tree.leaves() {
        prop_assert_eq!(cell.content.len(), cell.positions.len());
        prop_assert!(cell.content.len() < tree.capacity());
        prop_assert!(cell.positions.iter().all(|p| cell.region.contains(p)));
        area += cell.region.area();
        count += cell.content.len();
    }
    prop_assert!((area - tree.region().area()).abs() < 1e-9);
    prop_assert_eq!(count, tree.len());
    Ok(())
}

#[derive(Clone, Debug)]
enum Op {
    Insert,
    Remove(usize),
    RemoveAbsent(usize),
}

fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(Op::Insert),
            2 => any::<usize>().prop_map(Op::Remove),
            1 => any::<usize>().prop_map(Op::RemoveAbsent),
        ],
        0..=max_ops,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The disc query returns exactly the elements strictly inside the disc.
    #[test]
    fn circle_query_matches_brute_force(
        seed: u64,
        n in 0usize..600,
        capacity in 4usize..40,
        policy in policy(),
        center in (-0.5f64..1.5, -0.5f64..1.5),
        radius in 0.0f64..0.8,
    ) {
        let points = random_points(seed, n);
        let tree = build(&points, capacity, policy);
        let center = [center.0, center.1];

        let mut found = Vec::new();
        tree.query_circle(&center, radius, &mut found);

        let indexed: Vec<(u32, [f64; 2])> =
            points.iter().enumerate().map(|(i, &p)| (i as u32, p)).collect();
        prop_assert_eq!(sorted(found), brute_force(&indexed, center, radius));
    }

    /// Mixed insertions and removals keep the tree equal to the oracle and structurally sound.
    #[test]
    fn insert_remove_matches_oracle(
        seed: u64,
        capacity in 4usize..16,
        policy in policy(),
        ops in operations(400),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = QuadTreeConfig::default()
            .with_capacity(capacity)
            .with_split_policy(policy);
        let mut tree = QuadTree::<u32, [f64; 2]>::with_config(UNIT, config).unwrap();
        let mut oracle: Vec<(u32, [f64; 2])> = Vec::new();
        let mut next_id = 0;

        for op in ops {
            match op {
                Op::Insert => {
                    let point = [rng.gen(), rng.gen()];
                    tree.insert(next_id, point);
                    oracle.push((next_id, point));
                    next_id += 1;
                }
                Op::Remove(i) if !oracle.is_empty() => {
                    let (id, point) = oracle.swap_remove(i % oracle.len());
                    prop_assert!(tree.remove(id, point));
                }
                Op::Remove(_) => prop_assert!(!tree.remove(0, [0.5, 0.5])),
                Op::RemoveAbsent(i) => {
                    let point = [rng.gen(), rng.gen()];
                    prop_assert!(!tree.remove(next_id + i as u32 % 1000, point));
                }
            }
            prop_assert_eq!(tree.len(), oracle.len());
        }

        check_leaves(&tree)?;
        let expected = sorted(oracle.iter().map(|&(id, _)| id).collect());
        prop_assert_eq!(sorted(tree.elements()), expected);

        if oracle.len() < 4 {
            prop_assert_eq!(tree.count_leaves(), 1);
        }

        let mut all = Vec::new();
        tree.query_circle(&[0.5, 0.5], 1.0, &mut all);
        prop_assert_eq!(sorted(all), brute_force(&oracle, [0.5, 0.5], 1.0));
    }

    /// A step function of the distance samples exactly the elements of the disc query.
    #[test]
    fn step_probability_matches_circle(
        seed: u64,
        n in 0usize..500,
        capacity in 4usize..32,
        center in (0.0f64..1.0, 0.0f64..1.0),
        radius in 0.001f64..0.5,
    ) {
        let points = random_points(seed, n);
        let tree = build(&points, capacity, SplitPolicy::Adaptive);
        let center = [center.0, center.1];

        let mut exact = Vec::new();
        tree.query_circle(&center, radius, &mut exact);

        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        let mut sampled = Vec::new();
        tree.query_probabilistic(
            &center,
            |d| if d < radius { 1.0 } else { 0.0 },
            &mut rng,
            &mut sampled,
        );

        prop_assert_eq!(sorted(sampled), sorted(exact));
    }

    /// Reindexing and sorting rename elements without moving them.
    #[test]
    fn reindex_and_sort_keep_positions(
        seed: u64,
        n in 1usize..500,
        capacity in 4usize..64,
        offset in 0usize..1000,
    ) {
        let points = random_points(seed, n);
        let mut tree = build(&points, capacity, SplitPolicy::Theoretical);

        tree.sort_leaf_contents();
        for (_, cell) in tree.leaves() {
            prop_assert!(cell.positions.windows(2).all(|w| w[0][0] <= w[1][0]));
            for (&id, p) in cell.content.iter().zip(&cell.positions) {
                prop_assert_eq!(points[id as usize], *p);
            }
        }

        let coordinates = tree.coordinates();
        prop_assert_eq!(tree.reindex(offset), offset + n);
        prop_assert_eq!(tree.coordinates(), coordinates);
        let expected: Vec<u32> = (offset as u32..(offset + n) as u32).collect();
        prop_assert_eq!(tree.elements(), expected);
    }

    /// Every stored position maps to the stable identifier of the leaf holding it.
    #[test]
    fn cell_ids_follow_positions(
        seed: u64,
        n in 0usize..400,
        capacity in 4usize..24,
        policy in policy(),
    ) {
        let points = random_points(seed, n);
        let mut tree = build(&points, capacity, policy);
        tree.trim();

        let leaves = tree.assign_stable_ids();
        prop_assert_eq!(tree.max_stable_id(), leaves.checked_sub(1));
        for (_, cell) in tree.leaves() {
            for p in &cell.positions {
                prop_assert_eq!(tree.cell_id(p), cell.stable_id);
            }
        }
    }
}
