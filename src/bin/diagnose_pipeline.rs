// Diagnostic tool to trace the MRZ extraction pipeline stage by stage
//
// Usage: diagnose_pipeline [IMAGE...]
// Without arguments, walks MRZ_DATASET_ROOT (limited by MRZ_LIMIT).
// Set MRZ_DUMP_DIR to write every intermediate stage as a PNG.
use mrz_vision::models::AnyMatrix;
use mrz_vision::pipeline::{MrzLocator, StagedResult};
use mrz_vision::tools::{binary_stats, dataset_iter, dataset_root_from_env, grey_stats, load_argb, save_grey};
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mrz_vision=debug")),
        )
        .init();

    let args: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    let images: Vec<PathBuf> = if args.is_empty() {
        let limit = env::var("MRZ_LIMIT").ok().and_then(|v| v.parse().ok());
        dataset_iter(dataset_root_from_env(), limit).collect()
    } else {
        args
    };

    if images.is_empty() {
        println!("No images to diagnose");
        return;
    }

    let dump_dir = env::var("MRZ_DUMP_DIR").ok().map(PathBuf::from);
    let locator = MrzLocator::new();
    let mut found = 0usize;

    for path in &images {
        println!("\n============================================================");
        println!("DIAGNOSING: {}", path.display());
        println!("============================================================\n");
        if diagnose_image(&locator, path, dump_dir.as_deref()) {
            found += 1;
        }
    }

    println!("\nMRZ located in {}/{} images", found, images.len());
}

fn diagnose_image(locator: &MrzLocator, path: &Path, dump_dir: Option<&Path>) -> bool {
    let image = match load_argb(path) {
        Ok(image) => image,
        Err(e) => {
            println!("Failed to open image: {}", e);
            return false;
        }
    };
    println!("Step 1: Image loaded - {}x{} pixels", image.width, image.height);

    let staged = match image.to_matrix().and_then(|m| locator.locate_staged(&AnyMatrix::U32(m))) {
        Ok(staged) => staged,
        Err(e) => {
            println!("Pipeline failed: {}", e);
            return false;
        }
    };

    report(&staged);

    if let Some(dir) = dump_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        if let Err(e) = dump_stages(&staged, dir, &stem) {
            println!("Failed to dump stages: {}", e);
        }
    }

    staged.region.is_some()
}

fn report(staged: &StagedResult) {
    let lum = grey_stats(&staged.luminance);
    println!(
        "Step 2: Luminance - min={:.0} max={:.0} mean={:.1}",
        lum.min, lum.max, lum.mean
    );
    println!(
        "Step 3: Blur {}x{}, black-hat {}x{}",
        staged.blurred.width(),
        staged.blurred.height(),
        staged.for_ocr.width(),
        staged.for_ocr.height()
    );

    let grad = grey_stats(&staged.gradient);
    println!(
        "Step 4: Gradient {}x{} mean={:.1}",
        staged.gradient.width(),
        staged.gradient.height(),
        grad.mean
    );

    let bin = binary_stats(&staged.binary);
    println!(
        "Step 5: Otsu threshold {:.2}, {:.1}% set",
        staged.telemetry.otsu_threshold,
        bin.set_ratio * 100.0
    );
    let band = binary_stats(&staged.band);
    println!(
        "Step 6: Band image {}x{} at {:?}, {:.1}% set",
        staged.band.width(),
        staged.band.height(),
        staged.band_origin,
        band.set_ratio * 100.0
    );

    if staged.telemetry.flat_input {
        println!("  - Flat gradient, nothing to label");
    }
    if let Some(objects) = &staged.objects {
        println!("Step 7: {} components", objects.len());
        for (i, o) in objects.sorted_by_size().iter().enumerate().take(10) {
            println!(
                "    [{:2}] label={} pixels={} bbox=({}, {}) {}x{} aspect={:.2}",
                i,
                o.label,
                o.pixel_count,
                o.x,
                o.y,
                o.width,
                o.height,
                o.aspect_ratio()
            );
        }
    }

    let t = &staged.telemetry;
    println!(
        "Step 8: examined={} rejected aspect={} width={} shape={}",
        t.examined, t.rejected_aspect, t.rejected_width, t.rejected_shape
    );
    match &staged.region {
        Some(region) => println!(
            "  ✓ MRZ at ({}, {}) {}x{}",
            region.bounding_box.x, region.bounding_box.y, region.bounding_box.width, region.bounding_box.height
        ),
        None => println!("  ✗ No MRZ found"),
    }
}

fn dump_stages(staged: &StagedResult, dir: &Path, stem: &str) -> Result<(), image::ImageError> {
    std::fs::create_dir_all(dir)?;
    save_grey(&staged.luminance, dir.join(format!("{stem}_0_luminance.png")))?;
    save_grey(&staged.for_ocr, dir.join(format!("{stem}_1_blackhat.png")))?;
    save_grey(&staged.gradient, dir.join(format!("{stem}_2_gradient.png")))?;
    save_grey(&staged.lines, dir.join(format!("{stem}_3_lines.png")))?;
    save_grey(&staged.band, dir.join(format!("{stem}_4_band.png")))?;
    if let Some(region) = &staged.region {
        save_grey(&region.crop, dir.join(format!("{stem}_5_mrz.png")))?;
    }
    Ok(())
}
