use cartprune::data::Matrix;
use cartprune::grower::GrowPolicy;
use cartprune::metric::Task;
use cartprune::pruning::complexity_sequence;
use cartprune::selector::{select_optimal_complexity, TieBreak};
use cartprune::splitter::Splitter;
use cartprune::tree::tree::Tree;
use cartprune::CartTree;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

fn synthetic(n: usize, cols: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut flat = Vec::with_capacity(n * cols);
    for _ in 0..(n * cols) {
        flat.push(rng.gen::<f64>());
    }
    let y: Vec<f64> = (0..n)
        .map(|i| {
            let x0 = flat[i];
            let x1 = flat[n + i];
            let step = if x0 < 0.5 { 0.0 } else { 10.0 };
            step + x1 + rng.gen::<f64>() * 0.5
        })
        .collect();
    (flat, y)
}

pub fn tree_benchmarks(c: &mut Criterion) {
    let n = 2000;
    let cols = 4;
    let (flat, y) = synthetic(n, cols, 0);
    let data = Matrix::new(&flat, n, cols);

    let splitter = Splitter {
        task: Task::Regression,
        min_samples_split: 10,
        min_samples_leaf: 5,
        min_impurity_decrease: 0.0,
        max_depth: 20,
    };

    c.bench_function("tree fit", |b| {
        b.iter(|| {
            let mut tree = Tree::new();
            tree.fit(
                black_box(&data),
                data.index.to_owned(),
                black_box(&y),
                &splitter,
                &GrowPolicy::DepthWise,
            );
            tree
        })
    });

    let mut tree = Tree::new();
    tree.fit(&data, data.index.to_owned(), &y, &splitter, &GrowPolicy::DepthWise);

    c.bench_function("complexity sequence", |b| b.iter(|| complexity_sequence(black_box(&tree))));

    let master = complexity_sequence(&tree);
    let mid_cp = master[master.len() / 2].0;
    c.bench_function("prune at", |b| b.iter(|| tree.prune_at(black_box(mid_cp)).unwrap()));

    c.bench_function("predict", |b| b.iter(|| tree.predict(black_box(&data), false)));

    let mut model = CartTree::default().set_n_folds(5);
    model.fit(&data, &y).unwrap();
    let path = model.pruning_path().unwrap();
    c.bench_function("select optimal complexity", |b| {
        b.iter(|| select_optimal_complexity(black_box(path), TieBreak::SmallestTree).unwrap())
    });
}

criterion_group!(benches, tree_benchmarks);
criterion_main!(benches);
