use criterion::{criterion_group, criterion_main, Criterion};
use grid_index::FlatSegmentTree;

fn fst_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("FST search");

    for segment_count in [10i64, 100, 1_000, 10_000] {
        let max = segment_count * 10;

        let mut db = FlatSegmentTree::new(0, max, 0i64);

        for i in 0..segment_count {
            db.insert_segment(i * 10, i * 10 + 5, i + 1);
        }

        db.build_tree();

        let key = max / 10 * 6 + 2;
        let expected = db.search(key).unwrap().value;

        group.bench_function(format!("linear scan ({segment_count} segments)"), |b| {
            b.iter(|| {
                assert_eq!(expected, db.search(key).unwrap().value);
            });
        });

        group.bench_function(format!("tree descent ({segment_count} segments)"), |b| {
            b.iter(|| {
                assert_eq!(expected, db.search_tree(key).unwrap().value);
            });
        });
    }
}

fn fst_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("FST paint");

    for segment_count in [100i64, 1_000] {
        group.bench_function(format!("insert_segment ({segment_count} segments)"), |b| {
            b.iter(|| {
                let mut db = FlatSegmentTree::new(0, segment_count * 10, 0i64);

                for i in 0..segment_count {
                    db.insert_segment(i * 10, i * 10 + 5, i + 1);
                }

                assert_eq!(1, db.search(2).unwrap().value);
            });
        });
    }
}

criterion_group!(benches, fst_search, fst_paint);
criterion_main!(benches);
