use grid_index::SegmentTree;
use test_log::test;

fn sorted_hits<'a>(db: &'a SegmentTree<i64, &'static str>, key: i64) -> Vec<&'static str> {
    let mut hits: Vec<&'static str> = db.search(key).map(|s| *s.value).collect();
    hits.sort_unstable();
    hits
}

/// The classic seven-interval stabbing scenario.
fn build_seven() -> SegmentTree<i64, &'static str> {
    let mut db = SegmentTree::new();
    db.insert(0, 10, "A").expect("valid");
    db.insert(0, 5, "B").expect("valid");
    db.insert(5, 12, "C").expect("valid");
    db.insert(10, 24, "D").expect("valid");
    db.insert(4, 24, "E").expect("valid");
    db.insert(0, 26, "F").expect("valid");
    db.insert(12, 26, "G").expect("valid");
    db
}

#[test]
fn segment_tree_stabbing_multiset() {
    let mut db = build_seven();
    db.build_tree();

    assert_eq!(vec!["A", "B", "F"], sorted_hits(&db, 0));
    assert_eq!(vec!["A", "B", "E", "F"], sorted_hits(&db, 4));
    assert_eq!(vec!["A", "C", "E", "F"], sorted_hits(&db, 5));
    assert_eq!(vec!["A", "C", "E", "F"], sorted_hits(&db, 9));
    assert_eq!(vec!["C", "D", "E", "F"], sorted_hits(&db, 10));
    assert_eq!(vec!["D", "E", "F", "G"], sorted_hits(&db, 12));
    assert_eq!(vec!["D", "E", "F", "G"], sorted_hits(&db, 23));
    assert_eq!(vec!["F", "G"], sorted_hits(&db, 24));
    assert_eq!(vec!["F", "G"], sorted_hits(&db, 25));

    // Outside the endpoint span.
    assert!(sorted_hits(&db, 26).is_empty());
    assert!(sorted_hits(&db, 30).is_empty());
    assert!(sorted_hits(&db, -1).is_empty());
}

#[test]
fn segment_tree_search_against_brute_force() {
    let intervals: Vec<(i64, i64)> = vec![
        (0, 10),
        (0, 5),
        (5, 12),
        (10, 24),
        (4, 24),
        (0, 26),
        (12, 26),
        (3, 7),
        (18, 22),
    ];

    let mut db = SegmentTree::new();

    for (i, &(low, high)) in intervals.iter().enumerate() {
        db.insert(low, high, i).expect("valid");
    }

    db.build_tree();

    for key in -2..30 {
        let mut expected: Vec<usize> = intervals
            .iter()
            .enumerate()
            .filter(|(_, &(low, high))| low <= key && key < high)
            .map(|(i, _)| i)
            .collect();
        expected.sort_unstable();

        let mut got: Vec<usize> = db.search(key).map(|s| *s.value).collect();
        got.sort_unstable();

        assert_eq!(expected, got, "stab at {key}");
    }
}

#[test]
fn segment_tree_erase_if_and_rebuild() {
    let mut db = build_seven();
    db.build_tree();

    let removed = db.erase_if(|_, _, &v| v == "E" || v == "B");
    assert_eq!(2, removed);
    assert_eq!(5, db.size());
    assert!(!db.is_tree_valid());

    db.build_tree();
    assert_eq!(vec!["A", "C", "F"], sorted_hits(&db, 5));

    // Erasing nothing keeps the tree valid.
    let removed = db.erase_if(|_, _, &v| v == "does not exist");
    assert_eq!(0, removed);
    assert!(db.is_tree_valid());
}

#[test]
fn segment_tree_stab_yields_interval_bounds() {
    let mut db = SegmentTree::new();
    db.insert(3, 7, 'x').expect("valid");
    db.build_tree();

    let stab = db.search(5).next().expect("one hit");
    assert_eq!((3, 7, &'x'), (stab.low, stab.high, stab.value));
}

#[test]
fn segment_tree_clear_and_boundaries() {
    let mut db = build_seven();
    assert_eq!(vec![0, 4, 5, 10, 12, 24, 26], db.boundary_keys());

    db.clear();
    assert!(db.is_empty());
    assert!(db.boundary_keys().is_empty());

    db.build_tree();
    assert!(db.is_tree_valid());
    assert_eq!(0, db.search(5).count());
}

#[test]
fn segment_tree_copy_and_equality_ignore_tree_state() {
    let db1 = build_seven();

    let mut db2 = db1.clone();
    db2.build_tree();

    assert_eq!(db1, db2);

    db2.erase_if(|low, _, _| low == 0);
    assert_ne!(db1, db2);
}
