use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;
use symtable::{SymTable, Tiers};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn populated(seed: u64, n: usize) -> (SymTable<u64>, Vec<String>) {
    let mut t = SymTable::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.put(k, i as u64).unwrap();
    }
    (t, keys)
}

// Crosses every default tier: 509 -> 65521 buckets.
fn bench_put_100k(c: &mut Criterion) {
    c.bench_function("symtable::put_fresh_100k", |b| {
        b.iter_batched(
            || lcg(1).take(100_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut t = SymTable::new();
                for (i, k) in keys.iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

// Same load with growth disabled, to isolate rehash cost.
fn bench_put_100k_single_tier(c: &mut Criterion) {
    c.bench_function("symtable::put_fresh_100k_single_tier", |b| {
        b.iter_batched(
            || lcg(1).take(100_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut t = SymTable::with_tiers(Tiers::new(vec![65521]).unwrap()).unwrap();
                for (i, k) in keys.iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let (t, keys) = populated(7, 50_000);
    c.bench_function("symtable::get_hit_50k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let (t, _) = populated(11, 50_000);
    let misses: Vec<String> = lcg(0xdead_beef).take(50_000).map(key).collect();
    c.bench_function("symtable::get_miss_50k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(t.contains(k));
            }
        })
    });
}

fn bench_remove_all(c: &mut Criterion) {
    c.bench_function("symtable::remove_all_50k", |b| {
        b.iter_batched(
            || populated(3, 50_000),
            |(mut t, keys)| {
                for k in &keys {
                    black_box(t.remove(k));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_map(c: &mut Criterion) {
    let (t, _) = populated(5, 50_000);
    c.bench_function("symtable::map_50k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            t.map(|_, v, sum: &mut u64| *sum = sum.wrapping_add(*v), &mut sum);
            black_box(sum)
        })
    });
}

fn config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(3))
        .sample_size(20)
}

criterion_group! {
    name = benches;
    config = config();
    targets = bench_put_100k, bench_put_100k_single_tier, bench_get_hit, bench_get_miss, bench_remove_all, bench_map
}
criterion_main!(benches);
