use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use filefinder::{find_files, find_files_in, find_files_sequential, MemoryTree, OsTree};
use std::fs;
use tempfile::tempdir;

const NUM_FILES: usize = 1_000;
const WORDS_PER_FILE: usize = 2_000;
const WORDS_PER_LINE: usize = 30;

fn file_contents(words: usize) -> String {
    let mut data = String::with_capacity(words * 10 + words / WORDS_PER_LINE);
    for i in 0..words {
        data.push_str("something ");
        if (i + 1) % WORDS_PER_LINE == 0 {
            data.push('\n');
        }
    }
    data
}

fn generate_tree(num_files: usize, words_per_file: usize) -> MemoryTree {
    let contents = file_contents(words_per_file);
    (0..num_files).fold(MemoryTree::new(), |tree, i| {
        tree.with_file(&format!("file{i}"), &contents)
    })
}

/// Worst case for both walks: the word is absent, so every line of every file is read
fn bench_concurrent_vs_sequential(c: &mut Criterion) {
    let tree = generate_tree(NUM_FILES, WORDS_PER_FILE);

    let mut group = c.benchmark_group("Flat Tree");
    group.sample_size(10);
    group.bench_function("concurrent", |b| {
        b.iter(|| black_box(find_files(tree.clone(), "customWord").unwrap().count()))
    });
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(find_files_sequential(&tree, "customWord").unwrap().len()))
    });
    group.finish();
}

fn bench_nested_scaling(c: &mut Criterion) {
    let contents = file_contents(1_000);
    let mut group = c.benchmark_group("Nested Scaling");
    group.sample_size(10);
    for depth in [1, 4, 16] {
        let tree = (0..512).fold(MemoryTree::new(), |tree, i| {
            let dir = (0..depth)
                .map(|level| format!("d{}", (i >> level) % 4))
                .collect::<Vec<_>>()
                .join("/");
            tree.with_file(&format!("{dir}/file{i}"), &contents)
        });
        group.bench_with_input(BenchmarkId::new("concurrent", depth), &tree, |b, tree| {
            b.iter(|| black_box(find_files(tree.clone(), "customWord").unwrap().count()))
        });
    }
    group.finish();
}

fn bench_os_tree(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let contents = file_contents(2_000);
    for i in 0..200 {
        let sub = dir.path().join(format!("dir{}", i % 10));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("file{i}.txt")), &contents).unwrap();
    }

    let mut group = c.benchmark_group("OS Tree");
    group.bench_function("concurrent", |b| {
        b.iter(|| black_box(find_files_in(dir.path(), "customWord").unwrap().count()))
    });
    group.bench_function("sequential", |b| {
        let tree = OsTree::new(dir.path());
        b.iter(|| black_box(find_files_sequential(&tree, "customWord").unwrap().len()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_concurrent_vs_sequential,
    bench_nested_scaling,
    bench_os_tree
);
criterion_main!(benches);
