use grid_index::{Error, PointQuadTree};
use test_log::test;

#[test]
fn quad_tree_window_search_grid_corners() {
    let mut db = PointQuadTree::new();

    for x in 0..3 {
        for y in 0..3 {
            db.insert(x, y, (x, y));
        }
    }

    let mut hits: Vec<(i32, i32)> = db
        .search_region(0, 0, 1, 1)
        .into_iter()
        .copied()
        .collect();
    hits.sort_unstable();

    assert_eq!(vec![(0, 0), (0, 1), (1, 0), (1, 1)], hits);
}

#[test]
fn quad_tree_window_search_against_brute_force() {
    let mut db = PointQuadTree::new();

    // A deterministic scatter of points.
    let points: Vec<(i64, i64)> = (0..60)
        .map(|i: i64| ((i * 37) % 101, (i * 59) % 97))
        .collect();

    for &(x, y) in &points {
        db.insert(x, y, (x, y));
    }

    let windows = [
        (0, 0, 100, 100),
        (10, 10, 40, 60),
        (50, 0, 70, 30),
        (90, 90, 100, 100),
        (33, 41, 33, 41),
    ];

    for &(x1, y1, x2, y2) in &windows {
        let mut expected: Vec<(i64, i64)> = points
            .iter()
            .copied()
            .filter(|&(x, y)| x1 <= x && x <= x2 && y1 <= y && y <= y2)
            .collect();
        expected.sort_unstable();
        expected.dedup();

        let mut got: Vec<(i64, i64)> = db
            .search_region_iter(x1, y1, x2, y2)
            .map(|entry| (entry.x, entry.y))
            .collect();
        got.sort_unstable();

        assert_eq!(expected, got, "window ({x1}, {y1})..({x2}, {y2})");
    }
}

#[test]
fn quad_tree_removal_preserves_all_other_points() {
    let points: Vec<(i32, i32)> = vec![
        (25, 32),
        (5, 45),
        (52, 10),
        (80, 5),
        (40, 50),
        (10, 10),
        (20, 20),
        (60, 30),
        (70, 42),
        (35, 25),
        (48, 70),
        (12, 66),
        (88, 87),
        (3, 3),
        (55, 55),
    ];

    // Remove every point in turn, from a freshly built tree each time.
    for &victim in &points {
        let mut db = PointQuadTree::new();

        for &(x, y) in &points {
            db.insert(x, y, (x, y));
        }

        db.remove(victim.0, victim.1);

        assert_eq!(points.len() - 1, db.size());
        db.check_integrity()
            .unwrap_or_else(|e| panic!("integrity after removing {victim:?}: {e}"));

        for &(x, y) in &points {
            if (x, y) == victim {
                assert_eq!(Err(Error::NotFound), db.find(x, y));
            } else {
                assert_eq!(&(x, y), db.find(x, y).expect("point survives"));
            }
        }
    }
}

#[test]
fn quad_tree_drain_by_removal() {
    let points: Vec<(i32, i32)> = (0..40).map(|i| ((i * 13) % 83, (i * 29) % 79)).collect();

    let mut db = PointQuadTree::new();

    for &(x, y) in &points {
        db.insert(x, y, (x, y));
    }

    let mut unique = points.clone();
    unique.sort_unstable();
    unique.dedup();

    let mut remaining = unique.len();
    assert_eq!(remaining, db.size());

    for &(x, y) in &unique {
        db.remove(x, y);
        remaining -= 1;

        assert_eq!(remaining, db.size());
        db.check_integrity()
            .unwrap_or_else(|e| panic!("integrity after removing ({x}, {y}): {e}"));
    }

    assert!(db.is_empty());
}

#[test]
fn quad_tree_copy_and_equality() {
    let mut db = PointQuadTree::new();
    db.insert(25, 32, "a");
    db.insert(5, 45, "b");
    db.insert(52, 10, "c");

    let copy = db.clone();
    assert_eq!(db, copy);
    copy.check_integrity().expect("copy is valid");

    // Equality compares the stored point set, not the tree shape.
    let mut reordered = PointQuadTree::new();
    reordered.insert(52, 10, "c");
    reordered.insert(5, 45, "b");
    reordered.insert(25, 32, "a");
    assert_eq!(db, reordered);

    db.remove(5, 45);
    assert_ne!(db, copy);
}

#[test]
fn quad_tree_swap_and_clear() {
    let mut db1 = PointQuadTree::new();
    db1.insert(1, 1, 'a');

    let mut db2 = PointQuadTree::new();
    db2.insert(2, 2, 'b');
    db2.insert(3, 3, 'c');

    db1.swap(&mut db2);
    assert_eq!(2, db1.size());
    assert_eq!(1, db2.size());
    assert_eq!(&'a', db2.find(1, 1).expect("moved"));

    db1.clear();
    assert!(db1.is_empty());
    assert_eq!(None, db1.x_range());
}

#[test]
fn quad_tree_observed_ranges_grow_monotonically() {
    let mut db = PointQuadTree::new();
    db.insert(10, 5, 'a');
    db.insert(-3, 40, 'b');

    assert_eq!(Some((-3, 10)), db.x_range());
    assert_eq!(Some((5, 40)), db.y_range());

    // Removal does not shrink the observed ranges.
    db.remove(-3, 40);
    assert_eq!(Some((-3, 10)), db.x_range());
    assert_eq!(Some((5, 40)), db.y_range());
}
