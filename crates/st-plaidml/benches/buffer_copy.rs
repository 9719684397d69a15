use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use st_plaidml::{dense_strides, Buffer, DType, TensorShape};

const DEVICE: &str = "llvm_cpu.0";

fn bench_buffer_copy(c: &mut Criterion) {
    st_plaidml::init().expect("init");
    let shape = TensorShape::new(DType::Float32, &[64, 64, 4]).expect("shape");
    let buffer = Buffer::new(DEVICE, &shape).expect("buffer");
    let nbytes = shape.nbytes().expect("nbytes") as usize;
    let src = vec![0x5Au8; nbytes];
    let mut dst = vec![0u8; nbytes];

    let mut group = c.benchmark_group("buffer_copy");
    group.bench_function("copy_from", |b| {
        b.iter(|| criterion::black_box(buffer.copy_from(&src).expect("copy_from")));
    });
    group.bench_function("copy_into", |b| {
        b.iter(|| criterion::black_box(buffer.copy_into(&mut dst).expect("copy_into")));
    });
    group.bench_function("dense_strides_rank8", |b| {
        b.iter_batched(
            || [2i64, 3, 4, 5, 6, 7, 8, 9],
            |sizes| criterion::black_box(dense_strides(&sizes)),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_buffer_copy);
criterion_main!(benches);
