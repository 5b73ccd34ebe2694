// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, Criterion};
use framefx::{adjust, effect};
use image_rs::{Rgb, RgbImage};
use std::hint::black_box; // Use std::hint::black_box

fn test_frame() -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn frame_processing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_processing");
    let frame = test_frame();

    group.bench_function("adjust_640x480", |b| {
        b.iter(|| {
            let _ = black_box(adjust::apply(black_box(&frame), 25, 1.3));
        });
    });

    group.bench_function("grayscale_640x480", |b| {
        b.iter(|| {
            let _ = black_box(effect::grayscale(black_box(&frame)));
        });
    });

    group.bench_function("edge_640x480", |b| {
        b.iter(|| {
            let _ = black_box(effect::edge(black_box(&frame)));
        });
    });

    group.bench_function("blur_640x480", |b| {
        b.iter(|| {
            let _ = black_box(effect::blur(black_box(&frame)));
        });
    });

    group.finish();
}

criterion_group!(benches, frame_processing_benchmark);
criterion_main!(benches);
