// ABOUTME: Benchmark for rasterizing images into half-block terminal frames
// ABOUTME: Covers resize plus quantization for each color profile and the final escape rendering

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use imgcat_core::{rasterize, ColorProfile, PixelGrid};
use image::{Rgba, RgbaImage};

fn gradient(width: u32, height: u32) -> PixelGrid {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
            255,
        ])
    });
    PixelGrid::from(img)
}

fn benchmark_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    let grid = gradient(1024, 768);

    for profile in [
        ColorProfile::TrueColor,
        ColorProfile::Ansi256,
        ColorProfile::Ansi16,
        ColorProfile::Ascii,
    ] {
        group.bench_with_input(
            BenchmarkId::new("profile", profile),
            &profile,
            |b, profile| b.iter(|| rasterize(&grid, 48, *profile)),
        );
    }

    group.finish();
}

fn benchmark_viewport_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_rows");
    let grid = gradient(1024, 768);

    for rows in [24u32, 48, 96].iter() {
        group.bench_with_input(BenchmarkId::new("truecolor", rows), rows, |b, rows| {
            b.iter(|| rasterize(&grid, *rows, ColorProfile::TrueColor))
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let frame = rasterize(&gradient(640, 480), 48, ColorProfile::Ansi256);
    c.bench_function("render_frame", |b| b.iter(|| frame.render()));
}

criterion_group!(
    benches,
    benchmark_rasterize,
    benchmark_viewport_sizes,
    benchmark_render
);
criterion_main!(benches);
