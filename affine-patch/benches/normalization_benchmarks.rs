use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use affine_core::{Affine2, AffineParams, Image};
use affine_patch::{Blur, GaussianBlur, PatchNormalizer};

fn create_benchmark_image(size: usize) -> Image {
    Image::from_fn(size, size, |col, row| ((col * 31 + row * 17) % 255) as f32)
}

/// Benchmark patch normalization across both sampling strategies
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let img = create_benchmark_image(256);
    let frame = Affine2::new(1.3, 0.0, 0.2, 1.0 / 1.3);

    // 1.0 samples directly, the rest go through the blurred intermediate
    for &s in &[1.0f32, 2.0, 4.0, 8.0] {
        let mut normalizer = PatchNormalizer::new(AffineParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("scale", s), &s, |b, &s| {
            b.iter(|| black_box(normalizer.normalize(img.view(), 128.0, 128.0, black_box(s), frame, 0.3)))
        });
    }

    group.finish();
}

/// Benchmark the separable blur on intermediate-sized buffers
fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_blur");

    for &size in &[33usize, 85, 169] {
        let mut buf = vec![1.0f32; size * size];
        let mut blur = GaussianBlur::new();
        let sigma = 1.5 * size as f32 / 41.0;
        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, &size| {
            b.iter(|| blur.blur_in_place(black_box(&mut buf), size, size, sigma))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_blur);
criterion_main!(benches);
