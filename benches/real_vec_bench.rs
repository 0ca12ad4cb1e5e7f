use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use stencil_rs::{Backend, BinOp, Fold, Linear, Native, RealVec, Reference};

type V16 = RealVec<f32, Fold<1, 4, 4, 1>, 16>;
type V8 = RealVec<f32, Linear<8>, 8>;
type V8d = RealVec<f64, Linear<8>, 8>;

const N: usize = 1024;

fn random<T>(rng: &mut StdRng, make: impl Fn(&mut StdRng) -> T) -> Vec<T> {
    (0..N).map(|_| make(rng)).collect()
}

fn fma_sweep<B: Backend>(a: &[V16], b: &[V16], out: &mut [V16]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        let prod = x.binary_with::<B>(BinOp::Mul, y);
        *o = prod.binary_with::<B>(BinOp::Add, o);
    }
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let a = random(&mut rng, |r| V16::from_fn(|_| r.gen_range(-1.0..1.0)));
    let b = random(&mut rng, |r| V16::from_fn(|_| r.gen_range(-1.0..1.0)));

    let mut group = c.benchmark_group("mul_add_f32x16");
    group.throughput(Throughput::Elements((N * 16) as u64));
    group.bench_function("reference", |bch| {
        let mut out = vec![V16::zero(); N];
        bch.iter(|| fma_sweep::<Reference>(black_box(&a), black_box(&b), &mut out))
    });
    group.bench_function("native", |bch| {
        let mut out = vec![V16::zero(); N];
        bch.iter(|| fma_sweep::<Native>(black_box(&a), black_box(&b), &mut out))
    });
    group.finish();

    let mut group = c.benchmark_group("div_f32x16");
    group.throughput(Throughput::Elements((N * 16) as u64));
    group.bench_function("exact", |bch| {
        bch.iter(|| a.iter().zip(&b).map(|(x, y)| *x / *y).fold(V16::zero(), |s, v| s + v))
    });
    group.bench_function("approx", |bch| {
        bch.iter(|| {
            a.iter()
                .zip(&b)
                .map(|(x, y)| x.div_approx(y))
                .fold(V16::zero(), |s, v| s + v)
        })
    });
    group.finish();
}

fn bench_shuffles(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let regs = random(&mut rng, |r| V8::from_fn(|_| r.gen()));
    let ctrl = V8::from_indices([1, 2, 3, 4, 5, 6, 7, 0]);

    let mut group = c.benchmark_group("shuffle_f32x8");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("align_3_reference", |bch| {
        bch.iter(|| {
            regs.windows(2)
                .map(|w| V8::align_with::<3, Reference>(&w[1], &w[0]))
                .fold(V8::zero(), |s, v| s + v)
        })
    });
    group.bench_function("align_3_native", |bch| {
        bch.iter(|| {
            regs.windows(2)
                .map(|w| V8::align_with::<3, Native>(&w[1], &w[0]))
                .fold(V8::zero(), |s, v| s + v)
        })
    });
    group.bench_function("permute_reference", |bch| {
        bch.iter(|| {
            regs.iter()
                .map(|r| V8::permute_with::<Reference>(&ctrl, r))
                .fold(V8::zero(), |s, v| s + v)
        })
    });
    group.bench_function("permute_native", |bch| {
        bch.iter(|| {
            regs.iter()
                .map(|r| V8::permute_with::<Native>(&ctrl, r))
                .fold(V8::zero(), |s, v| s + v)
        })
    });
    group.finish();
}

fn bench_streaming_store(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let src = random(&mut rng, |r| V8d::from_fn(|_| r.gen()));

    let mut group = c.benchmark_group("store_f64x8");
    group.throughput(Throughput::Elements((N * 8) as u64));
    group.bench_function("store_to", |bch| {
        let mut dst = vec![V8d::zero(); N];
        bch.iter(|| {
            for (s, d) in black_box(&src).iter().zip(dst.iter_mut()) {
                s.store_to(d);
            }
        })
    });
    group.bench_function("store_streaming", |bch| {
        let mut dst = vec![V8d::zero(); N];
        bch.iter(|| {
            for (s, d) in black_box(&src).iter().zip(dst.iter_mut()) {
                s.store_streaming(d);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_arithmetic, bench_shuffles, bench_streaming_store);
criterion_main!(benches);
