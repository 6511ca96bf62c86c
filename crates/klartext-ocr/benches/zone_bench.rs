// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the klartext-ocr crate. Benchmarks the zone
// preprocessing pipeline (crop + grayscale + PNG encode) that runs before
// every zone recognition call, on a synthetic page image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use klartext_core::types::Zone;
use klartext_ocr::PageImage;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark zone preprocessing on a 1240x1754 synthetic page.
///
/// Builds a light page with a dark text-like band and runs the crop +
/// grayscale + PNG encode steps. The OCR invocation itself is excluded;
/// this measures only the in-process part of the zone pipeline.
fn bench_zone_preprocessing(c: &mut Criterion) {
    let (width, height) = (1240u32, 1754u32);
    let mut img = GrayImage::from_pixel(width, height, Luma([235u8]));
    for y in 400..440 {
        for x in 100..1100 {
            img.put_pixel(x, y, Luma([20u8]));
        }
    }
    let page = DynamicImage::ImageLuma8(img);
    let zone = Zone::new(80, 380, 1050, 100);

    c.bench_function("zone_preprocessing (1240x1754)", |b| {
        b.iter(|| {
            let prepared = PageImage::from_dynamic(black_box(page.clone()))
                .crop(black_box(zone))
                .grayscale();
            black_box(prepared.to_png_bytes().unwrap());
        });
    });
}

criterion_group!(benches, bench_zone_preprocessing);
criterion_main!(benches);
