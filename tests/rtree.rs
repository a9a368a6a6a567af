use grid_index::rtree::{
    Extent, IntegrityCheckProps, NodeType, RTree, RTreeTraits, SearchMode,
};
use test_log::test;

/// Small node sizes force splits and underflows early.
struct TinyTraits;

impl RTreeTraits for TinyTraits {
    const MIN_NODE_SIZE: usize = 2;
    const MAX_NODE_SIZE: usize = 5;
    const MAX_TREE_DEPTH: usize = 100;
    const ENABLE_FORCED_REINSERTION: bool = false;
    const REINSERTION_SIZE: usize = 2;
}

/// Same sizes, with the R* overflow treatment switched on.
struct TinyTraitsReinsert;

impl RTreeTraits for TinyTraitsReinsert {
    const MIN_NODE_SIZE: usize = 2;
    const MAX_NODE_SIZE: usize = 5;
    const MAX_TREE_DEPTH: usize = 100;
    const ENABLE_FORCED_REINSERTION: bool = true;
    const REINSERTION_SIZE: usize = 2;
}

type TinyTree = RTree<i16, String, 2, TinyTraits>;

fn check(tree: &TinyTree) {
    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("tree invariants hold");
}

#[test]
fn rtree_basic_search() {
    let mut tree = TinyTree::new();

    tree.insert(([0, 0], [2, 2]).into(), "test".into());
    assert_eq!(1, tree.size());
    assert_eq!(Extent::new([0, 0], [2, 2]), tree.extent());

    tree.insert(([3, 3], [5, 5]).into(), "test again".into());
    assert_eq!(2, tree.size());
    assert_eq!(Extent::new([0, 0], [5, 5]), tree.extent());

    tree.insert(([-2, 1], [3, 6]).into(), "more test".into());
    assert_eq!(3, tree.size());
    assert_eq!(Extent::new([-2, 0], [5, 6]), tree.extent());
    check(&tree);

    let hits: Vec<&String> = tree
        .search([1, 1].into(), SearchMode::Overlap)
        .map(|e| e.value)
        .collect();
    assert_eq!(2, hits.len());
    assert!(hits.contains(&&"test".to_string()));
    assert!(hits.contains(&&"more test".to_string()));

    // Every corner point of an extent hits its value.
    for pt in [[0i16, 0i16], [2, 0], [0, 2], [2, 2]] {
        let hits: Vec<&String> = tree
            .search(pt.into(), SearchMode::Overlap)
            .map(|e| e.value)
            .collect();
        assert!(hits.contains(&&"test".to_string()), "corner {pt:?}");
    }

    // A point outside everything hits nothing.
    assert_eq!(
        0,
        tree.search([10, 10].into(), SearchMode::Overlap).count(),
    );
}

#[test]
fn rtree_insert_and_erase_to_empty() {
    let mut tree = TinyTree::new();

    tree.insert(([-2, -2], [2, 2]).into(), "erase me".into());
    assert_eq!(1, tree.size());
    assert_eq!(Extent::new([-2, -2], [2, 2]), tree.extent());

    let entry = tree
        .search([0, 0].into(), SearchMode::Overlap)
        .next()
        .map(|e| e.pos)
        .expect("one hit");

    let erased = tree.erase(entry).expect("live handle");
    assert_eq!("erase me", erased);
    assert!(tree.is_empty());
    assert_eq!(Extent::default(), tree.extent());
    check(&tree);

    // The handle is stale now.
    assert!(tree.erase(entry).is_err());
}

#[test]
fn rtree_erase_reshapes_extent() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [2, 2]).into(), "erase me".into());
    tree.insert(([-10, -4], [0, 0]).into(), "keep me".into());
    assert_eq!(Extent::new([-10, -4], [2, 2]), tree.extent());

    let entry = tree
        .search([-5, -2].into(), SearchMode::Overlap)
        .next()
        .map(|e| e.pos)
        .expect("one hit");
    tree.erase(entry).expect("live handle");

    assert_eq!(1, tree.size());
    assert_eq!(Extent::new([0, 0], [2, 2]), tree.extent());
    check(&tree);
}

#[test]
fn rtree_node_split_keeps_everything_searchable() {
    let mut tree = TinyTree::new();

    // A 10x10 grid of unit squares overflows many directories.
    for x in 0..10i16 {
        for y in 0..10i16 {
            tree.insert(
                ([x * 2, y * 2], [x * 2 + 1, y * 2 + 1]).into(),
                format!("{x}-{y}"),
            );
        }
    }

    assert_eq!(100, tree.size());
    check(&tree);

    for x in 0..10i16 {
        for y in 0..10i16 {
            let hits: Vec<&String> = tree
                .search([x * 2, y * 2].into(), SearchMode::Overlap)
                .map(|e| e.value)
                .collect();

            assert!(hits.contains(&&format!("{x}-{y}")), "({x}, {y}) lost");
        }
    }
}

#[test]
fn rtree_directory_node_split() {
    let mut tree = TinyTree::new();

    // A long diagonal stripe forces splits of non-leaf directories.
    for i in 0..1000i16 {
        let offset = i % 200;
        tree.insert(
            ([offset, offset], [offset + 1, offset + 1]).into(),
            format!("v{i}"),
        );
    }

    assert_eq!(1000, tree.size());
    check(&tree);

    let mut value_count = 0;
    let mut max_depth = 0;
    tree.walk(|props| {
        if props.node_type == NodeType::Value {
            value_count += 1;
        }
        max_depth = max_depth.max(props.depth);
    });

    assert_eq!(1000, value_count);
    assert!(max_depth >= 3, "the tree should have grown several levels");
}

#[test]
fn rtree_forced_reinsertion() {
    let mut tree: RTree<i16, String, 2, TinyTraitsReinsert> = RTree::new();

    for x in 0..10i16 {
        for y in 0..10i16 {
            tree.insert(
                ([x * 3, y * 3], [x * 3 + 2, y * 3 + 2]).into(),
                format!("{x}-{y}"),
            );
        }
    }

    assert_eq!(100, tree.size());
    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("tree invariants hold");

    for x in 0..10i16 {
        for y in 0..10i16 {
            let hits: Vec<&String> = tree
                .search([x * 3 + 1, y * 3 + 1].into(), SearchMode::Overlap)
                .map(|e| e.value)
                .collect();

            assert!(hits.contains(&&format!("{x}-{y}")), "({x}, {y}) lost");
        }
    }
}

#[test]
fn rtree_erase_dissolves_directories() {
    let mut tree = TinyTree::new();

    for x in 0..10i16 {
        for y in 0..10i16 {
            tree.insert(
                ([x * 2, y * 2], [x * 2 + 1, y * 2 + 1]).into(),
                format!("{x}-{y}"),
            );
        }
    }

    // Erase cells one by one; every intermediate tree must stay sound.
    for x in 0..10i16 {
        for y in 0..10i16 {
            let label = format!("{x}-{y}");

            let entry = tree
                .search([x * 2, y * 2].into(), SearchMode::Overlap)
                .find(|e| *e.value == label)
                .map(|e| e.pos)
                .expect("value still present");

            let erased = tree.erase(entry).expect("live handle");
            assert_eq!(label, erased);
            check(&tree);
        }
    }

    assert!(tree.is_empty());
    assert_eq!(Extent::default(), tree.extent());
}

#[test]
fn rtree_exact_search_by_extent() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [4, 4]).into(), "outer".into());
    tree.insert(([1, 1], [3, 3]).into(), "inner".into());
    tree.insert(([1, 1], [3, 3]).into(), "inner twin".into());

    let hits: Vec<&String> = tree
        .search_extent(([1, 1], [3, 3]).into(), SearchMode::Match)
        .map(|e| e.value)
        .collect();

    assert_eq!(2, hits.len());
    assert!(hits.contains(&&"inner".to_string()));
    assert!(hits.contains(&&"inner twin".to_string()));

    // Overlap mode finds all three.
    assert_eq!(
        3,
        tree.search_extent(([1, 1], [3, 3]).into(), SearchMode::Overlap)
            .count(),
    );

    // No exact match for a slightly different box.
    assert_eq!(
        0,
        tree.search_extent(([1, 1], [3, 4]).into(), SearchMode::Match)
            .count(),
    );
}

#[test]
fn rtree_exact_search_by_point() {
    let mut tree = TinyTree::new();
    tree.insert_point([5, 5].into(), "point".into());
    tree.insert(([0, 0], [10, 10]).into(), "area".into());

    // Match with a point query hits only the point-extent value.
    let hits: Vec<&String> = tree
        .search([5, 5].into(), SearchMode::Match)
        .map(|e| e.value)
        .collect();
    assert_eq!(vec![&"point".to_string()], hits);

    // Overlap hits both.
    assert_eq!(2, tree.search([5, 5].into(), SearchMode::Overlap).count());
}

#[test]
fn rtree_search_entries_carry_metadata() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [2, 2]).into(), "v".into());

    let entry = tree
        .search([1, 1].into(), SearchMode::Overlap)
        .next()
        .expect("one hit");

    assert_eq!(&Extent::new([0, 0], [2, 2]), entry.extent);
    // Root is the leaf directory, the value sits right below it.
    assert_eq!(1, entry.depth);
}

#[test]
fn rtree_copy_is_deep() {
    let mut tree = TinyTree::new();

    for i in 0..30i16 {
        tree.insert(([i, i], [i + 1, i + 1]).into(), format!("v{i}"));
    }

    let copy = tree.clone();
    check(&copy);
    assert_eq!(tree.size(), copy.size());
    assert_eq!(tree.extent(), copy.extent());

    // Erasing from the copy leaves the original untouched.
    let mut copy = copy;
    let entry = copy
        .search([0, 0].into(), SearchMode::Overlap)
        .next()
        .map(|e| e.pos)
        .expect("hit");
    copy.erase(entry).expect("live handle");

    assert_eq!(30, tree.size());
    assert_eq!(29, copy.size());
}

#[test]
fn rtree_move_leaves_source_empty() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [2, 2]).into(), "moved".into());

    let moved = std::mem::take(&mut tree);

    assert!(tree.is_empty());
    assert_eq!(Extent::default(), tree.extent());

    assert_eq!(1, moved.size());
    assert_eq!(
        1,
        moved.search([1, 1].into(), SearchMode::Overlap).count(),
    );
    check(&moved);
}

#[test]
fn rtree_walk_classifies_nodes() {
    let mut tree = TinyTree::new();

    for i in 0..12i16 {
        tree.insert(([i, 0], [i + 1, 1]).into(), format!("v{i}"));
    }

    let mut values = 0;
    let mut leaf_dirs = 0;
    let mut dirs = 0;

    tree.walk(|props| match props.node_type {
        NodeType::Value => values += 1,
        NodeType::LeafDirectory => leaf_dirs += 1,
        NodeType::Directory => dirs += 1,
    });

    assert_eq!(12, values);
    assert!(leaf_dirs >= 3, "12 values cannot fit fewer leaf directories");
    assert!(dirs >= 1, "the root must have become a non-leaf directory");
}

#[test]
fn rtree_integrity_check_aggregates() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [1, 1]).into(), "a".into());

    // Both modes pass on a healthy tree.
    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("valid");
    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: false,
    })
    .expect("valid");
}

#[test]
fn rtree_export_formats() {
    let mut tree = TinyTree::new();
    tree.insert(([0, 0], [2, 2]).into(), "a".into());
    tree.insert(([3, 3], [5, 5]).into(), "b".into());

    let formatted = tree
        .export_tree(grid_index::rtree::ExportFormat::FormattedNodeProperties)
        .expect("always available");
    assert!(formatted.contains("depth: 0; type: directory-leaf"));
    assert!(formatted.contains("type: value"));
    assert!(formatted.contains("(0, 0) - (2, 2)"));

    let obj = tree
        .export_tree(grid_index::rtree::ExportFormat::ExtentAsObj)
        .expect("two-dimensional");
    assert!(obj.starts_with("v "));
    assert!(obj.contains("\nf "));

    let svg = tree
        .export_tree(grid_index::rtree::ExportFormat::ExtentAsSvg)
        .expect("two-dimensional");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<rect"));
    assert!(svg.ends_with("</svg>\n"));
}

#[test]
fn rtree_randomized_insert_erase_stress() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    let mut tree: RTree<i16, usize, 2, TinyTraitsReinsert> = RTree::new();
    let mut live: Vec<usize> = Vec::new();
    let mut next_id = 0usize;

    for round in 0..400 {
        if live.is_empty() || rng.random_range(0..3) > 0 {
            let x = rng.random_range(-500..500i16);
            let y = rng.random_range(-500..500i16);
            let w = rng.random_range(0..20i16);
            let h = rng.random_range(0..20i16);

            tree.insert(([x, y], [x + w, y + h]).into(), next_id);
            live.push(next_id);
            next_id += 1;
        } else {
            let victim = live.swap_remove(rng.random_range(0..live.len()));

            let entry = tree
                .search_extent(([-520, -520], [520, 520]).into(), SearchMode::Overlap)
                .find(|e| *e.value == victim)
                .map(|e| e.pos)
                .expect("live value is reachable");

            assert_eq!(victim, tree.erase(entry).expect("live handle"));
        }

        assert_eq!(live.len(), tree.size(), "round {round}");

        if round % 25 == 0 {
            tree.check_integrity(IntegrityCheckProps {
                throw_on_first_error: true,
            })
            .unwrap_or_else(|e| panic!("integrity at round {round}: {e}"));
        }
    }

    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("final tree is sound");
}

#[test]
fn rtree_one_dimensional_keys() {
    struct Tiny1d;

    impl RTreeTraits for Tiny1d {
        const MIN_NODE_SIZE: usize = 2;
        const MAX_NODE_SIZE: usize = 5;
        const MAX_TREE_DEPTH: usize = 100;
        const ENABLE_FORCED_REINSERTION: bool = false;
        const REINSERTION_SIZE: usize = 2;
    }

    let mut tree: RTree<i64, &'static str, 1, Tiny1d> = RTree::new();
    tree.insert(([0], [10]).into(), "a");
    tree.insert(([5], [15]).into(), "b");
    tree.insert(([20], [30]).into(), "c");

    let hits: Vec<&&str> = tree
        .search([7].into(), SearchMode::Overlap)
        .map(|e| e.value)
        .collect();
    assert_eq!(2, hits.len());

    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("valid");
}

#[test]
fn rtree_float_keys() {
    let mut tree: RTree<f64, i32, 2, TinyTraits> = RTree::new();

    for i in 0..25 {
        let base = f64::from(i) * 1.5;
        tree.insert(([base, base], [base + 1.0, base + 1.0]).into(), i);
    }

    assert_eq!(25, tree.size());
    tree.check_integrity(IntegrityCheckProps {
        throw_on_first_error: true,
    })
    .expect("valid");

    let hits: Vec<&i32> = tree
        .search([0.5, 0.5].into(), SearchMode::Overlap)
        .map(|e| e.value)
        .collect();
    assert_eq!(vec![&0], hits);
}
