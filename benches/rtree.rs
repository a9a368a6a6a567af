use criterion::{criterion_group, criterion_main, Criterion};
use grid_index::rtree::{BulkLoader, RTree, SearchMode};

fn squares(count: i64) -> Vec<([i64; 2], [i64; 2])> {
    (0..count)
        .map(|i| {
            let x = (i % 100) * 3;
            let y = (i / 100) * 3;
            ([x, y], [x + 2, y + 2])
        })
        .collect()
}

fn rtree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("R-tree insert");

    for count in [100i64, 1_000, 10_000] {
        let extents = squares(count);

        group.bench_function(format!("incremental insert ({count} extents)"), |b| {
            b.iter(|| {
                let mut tree: RTree<i64, i64> = RTree::new();

                for (i, &(start, end)) in extents.iter().enumerate() {
                    tree.insert((start, end).into(), i as i64);
                }

                assert_eq!(count as usize, tree.size());
            });
        });

        group.bench_function(format!("bulk load ({count} extents)"), |b| {
            b.iter(|| {
                let mut loader: BulkLoader<i64, i64> = BulkLoader::new();

                for (i, &(start, end)) in extents.iter().enumerate() {
                    loader.insert((start, end).into(), i as i64);
                }

                let tree = loader.pack();
                assert_eq!(count as usize, tree.size());
            });
        });
    }
}

fn rtree_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("R-tree search");

    for count in [1_000i64, 10_000] {
        let mut loader: BulkLoader<i64, i64> = BulkLoader::new();

        for (i, &(start, end)) in squares(count).iter().enumerate() {
            loader.insert((start, end).into(), i as i64);
        }

        let tree = loader.pack();

        group.bench_function(format!("point overlap ({count} extents)"), |b| {
            b.iter(|| {
                let hits = tree.search([150, 27].into(), SearchMode::Overlap).count();
                assert!(hits >= 1);
            });
        });
    }
}

criterion_group!(benches, rtree_insert, rtree_search);
criterion_main!(benches);
