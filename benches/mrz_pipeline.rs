mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mrz_vision::batch::{ArgbImage, locate_batch};
use mrz_vision::tools::{load_argb, render_text_rows};
use mrz_vision::utils::grayscale::grey_argb;
use mrz_vision::{AnyMatrix, MrzConfig, MrzLocator};

fn synthetic_document() -> ArgbImage {
    let grey = render_text_rows(415, 600, 200, 20, &[(480, 496), (510, 526)], 50, 370);
    ArgbImage::new(415, 600, grey.to_vec().into_iter().map(grey_argb).collect())
}

fn bench_synthetic_document(c: &mut Criterion) {
    let document = synthetic_document();
    let image = AnyMatrix::U32(document.to_matrix().unwrap());
    let locator = MrzLocator::new();
    c.bench_function("locate_synthetic_415x600", |b| {
        b.iter(|| locator.locate(black_box(&image)).unwrap())
    });
}

fn bench_batch(c: &mut Criterion) {
    let documents = vec![synthetic_document(); 8];
    let config = MrzConfig::default();
    c.bench_function("locate_batch_8x415x600", |b| {
        b.iter(|| locate_batch(black_box(&documents), &config))
    });
}

fn bench_dataset(c: &mut Criterion) {
    let (root, paths) = common::collect_dataset_images();
    let images: Vec<ArgbImage> = paths.iter().filter_map(|p| load_argb(p).ok()).collect();
    if images.is_empty() {
        eprintln!("No dataset images under {}, skipping", root.display());
        return;
    }
    let config = MrzConfig::default();
    c.bench_function("locate_dataset", |b| {
        b.iter(|| locate_batch(black_box(&images), &config))
    });
}

criterion_group!(benches, bench_synthetic_document, bench_batch, bench_dataset);
criterion_main!(benches);
