use cloudmap_bench::util;
use cloudmap_project::Project;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_load_dataset(c: &mut Criterion) {
    let temp_dir = util::generate_synthetic_dataset_file(4, 6).unwrap();
    let path = temp_dir.path().join("dataset.json");

    c.bench_function("load_dataset_1555_nodes", |b| {
        b.iter(|| Project::load(path.clone()).unwrap())
    });
}

criterion_group!(benches, bench_load_dataset);
criterion_main!(benches);
