use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use embercask::Config;
use pprof::criterion::{Output, PProfProfiler};
use rand::prelude::*;
use tempfile::TempDir;

const ITER: usize = 10000;
const KEY_SIZE: usize = 1000;
const VAL_SIZE: usize = 10000;

fn prebuilt_kv_pairs(n: usize, key_size: usize, val_size: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            let key: Vec<u8> = (&mut rng).sample_iter(rand::distributions::Standard).take(key_size).collect();
            let val: Vec<u8> = (&mut rng).sample_iter(rand::distributions::Standard).take(val_size).collect();
            (key, val)
        })
        .collect()
}

fn open_store() -> (embercask::Handle, TempDir) {
    let tmpdir = tempfile::tempdir().unwrap();
    let bitcask = Config::default().open(tmpdir.path()).unwrap();
    (bitcask.get_handle(), tmpdir)
}

/// Calls `put` on the same store instance for every benchmark iteration; the
/// key and value are randomly generated byte sequences of `KEY_SIZE` and
/// `VAL_SIZE` bytes.
pub fn bench_write(c: &mut Criterion) {
    let kv_pairs = prebuilt_kv_pairs(ITER, KEY_SIZE, VAL_SIZE);
    let nbytes: usize = kv_pairs.iter().map(|(k, v)| k.len() + v.len()).sum();

    let mut g = c.benchmark_group("sequential_write");
    g.throughput(Throughput::Bytes(nbytes as u64));

    g.bench_with_input("embercask", &kv_pairs, |b, kv_pairs| {
        b.iter_batched(
            || {
                let (handle, tmpdir) = open_store();
                (handle, kv_pairs.to_vec(), tmpdir)
            },
            |(handle, kv_pairs, _tmpdir)| {
                kv_pairs.into_iter().for_each(|(k, v)| {
                    handle.put(black_box(Bytes::from(k)), black_box(Bytes::from(v))).unwrap();
                });
            },
            BatchSize::SmallInput,
        );
    });
    g.finish();
}

/// Calls `get` on a pre-populated store instance for every benchmark
/// iteration, in shuffled order so the reader pool sees random access
/// rather than sequential scan behavior.
pub fn bench_read(c: &mut Criterion) {
    let kv_pairs = prebuilt_kv_pairs(ITER, KEY_SIZE, VAL_SIZE);
    let nbytes: usize = kv_pairs.iter().map(|(k, v)| k.len() + v.len()).sum();

    let mut g = c.benchmark_group("sequential_read");
    g.throughput(Throughput::Bytes(nbytes as u64));

    let (handle, _tmpdir) = open_store();
    for (k, v) in kv_pairs.iter().cloned() {
        handle.put(Bytes::from(k), Bytes::from(v)).unwrap();
    }

    g.bench_with_input("embercask", &kv_pairs, |b, kv_pairs| {
        b.iter_batched(
            || {
                let mut kv_pairs = kv_pairs.to_vec();
                kv_pairs.shuffle(&mut rand::thread_rng());
                kv_pairs
            },
            |kv_pairs| {
                kv_pairs.into_iter().for_each(|(k, _v)| {
                    handle.get(black_box(Bytes::from(k))).unwrap();
                });
            },
            BatchSize::SmallInput,
        );
    });
    g.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_write, bench_read
);
criterion_main!(benches);
